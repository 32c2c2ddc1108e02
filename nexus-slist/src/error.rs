//! Error types for list and cursor operations.

use core::fmt;

use thiserror::Error;

/// Which half of an allocator binding an operation needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The allocate capability.
    Allocate,
    /// The deallocate capability.
    Deallocate,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Allocate => write!(f, "allocate"),
            Capability::Deallocate => write!(f, "deallocate"),
        }
    }
}

/// Failure of a list or cursor operation.
///
/// Every variant is recoverable. The list is left exactly as it was before
/// the failed call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    /// The binding has no function registered for this capability.
    #[error("{0} capability is not registered")]
    Unconfigured(Capability),

    /// A null list or cursor handle crossed the C ABI.
    #[error("invalid handle")]
    InvalidHandle,

    /// The chain ends before `index` can be reached.
    #[error("index {index} is out of range")]
    OutOfRange {
        /// The requested position.
        index: usize,
    },

    /// The allocate capability returned null or misaligned memory.
    #[error("allocation of {size} bytes failed")]
    AllocationFailed {
        /// Requested size in bytes.
        size: usize,
    },

    /// The cursor has run off the end of the chain.
    #[error("cursor is exhausted")]
    Exhausted,
}
