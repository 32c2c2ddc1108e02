//! Allocator bindings.
//!
//! Every allocation the crate makes (list headers, nodes, cursors) goes
//! through a pair of C-convention capabilities:
//!
//! ```text
//! allocate(size)   -> *mut c_void   (null = failure)
//! deallocate(ptr)                   (ptr from a prior allocate)
//! ```
//!
//! The [`Allocator`] trait abstracts over where that pair comes from:
//!
//! - [`Registered`] - the process-wide registration, read on every use
//! - [`Capabilities`] - a pair injected at construction time
//!
//! Missing capabilities are never fatal. Operations that need one fail with
//! [`ListError::Unconfigured`].

use std::ffi::c_void;
use std::sync::OnceLock;

use seqlock::SeqLock;
use tracing::trace;

use crate::{Capability, ListError};

/// Allocate capability: returns at least `size` bytes, or null on failure.
pub type AllocateFn = unsafe extern "C" fn(size: usize) -> *mut c_void;

/// Deallocate capability: releases a pointer returned by the paired
/// [`AllocateFn`]. Called exactly once per allocation.
pub type DeallocateFn = unsafe extern "C" fn(ptr: *mut c_void);

/// Source of the allocate/deallocate pair used by a list.
///
/// # Example
///
/// ```
/// use nexus_slist::{Allocator, Capabilities};
///
/// let unbound = Capabilities::default();
/// assert!(unbound.allocate_fn().is_none());
/// assert!(unbound.require_allocate().is_err());
///
/// let system = Capabilities::system();
/// assert!(system.require_deallocate().is_ok());
/// ```
pub trait Allocator {
    /// Returns the allocate capability, if bound.
    fn allocate_fn(&self) -> Option<AllocateFn>;

    /// Returns the deallocate capability, if bound.
    fn deallocate_fn(&self) -> Option<DeallocateFn>;

    /// Returns the allocate capability or [`ListError::Unconfigured`].
    #[inline]
    fn require_allocate(&self) -> Result<AllocateFn, ListError> {
        self.allocate_fn()
            .ok_or(ListError::Unconfigured(Capability::Allocate))
    }

    /// Returns the deallocate capability or [`ListError::Unconfigured`].
    #[inline]
    fn require_deallocate(&self) -> Result<DeallocateFn, ListError> {
        self.deallocate_fn()
            .ok_or(ListError::Unconfigured(Capability::Deallocate))
    }
}

// =============================================================================
// Capabilities - injected binding
// =============================================================================

/// An allocator binding passed explicitly at construction time.
///
/// The default value has nothing bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    allocate: Option<AllocateFn>,
    deallocate: Option<DeallocateFn>,
}

impl Capabilities {
    /// Binds both capabilities.
    pub const fn new(allocate: AllocateFn, deallocate: DeallocateFn) -> Self {
        Self {
            allocate: Some(allocate),
            deallocate: Some(deallocate),
        }
    }

    /// Binds the C library's `malloc` and `free`.
    pub const fn system() -> Self {
        Self::new(system_allocate, system_deallocate)
    }

    /// Replaces the allocate capability.
    pub const fn with_allocate(mut self, allocate: AllocateFn) -> Self {
        self.allocate = Some(allocate);
        self
    }

    /// Replaces the deallocate capability.
    pub const fn with_deallocate(mut self, deallocate: DeallocateFn) -> Self {
        self.deallocate = Some(deallocate);
        self
    }
}

impl Allocator for Capabilities {
    #[inline]
    fn allocate_fn(&self) -> Option<AllocateFn> {
        self.allocate
    }

    #[inline]
    fn deallocate_fn(&self) -> Option<DeallocateFn> {
        self.deallocate
    }
}

unsafe extern "C" fn system_allocate(size: usize) -> *mut c_void {
    unsafe { libc::malloc(size) }.cast()
}

unsafe extern "C" fn system_deallocate(ptr: *mut c_void) {
    unsafe { libc::free(ptr.cast()) }
}

// =============================================================================
// Registered - process-wide binding
// =============================================================================

/// The process-wide binding.
///
/// Zero-sized: every call reads the current registration, so functions
/// registered after a list was created are picked up by that list.
///
/// Registration is meant to happen once at startup, before any list is
/// used. Changing it while lists are live is only sound if the new
/// deallocate can release memory handed out by the old allocate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registered;

impl Allocator for Registered {
    #[inline]
    fn allocate_fn(&self) -> Option<AllocateFn> {
        registry().read().allocate_fn()
    }

    #[inline]
    fn deallocate_fn(&self) -> Option<DeallocateFn> {
        registry().read().deallocate_fn()
    }
}

fn registry() -> &'static SeqLock<Capabilities> {
    static REGISTRY: OnceLock<SeqLock<Capabilities>> = OnceLock::new();
    REGISTRY.get_or_init(|| SeqLock::new(Capabilities::default()))
}

/// Registers the process-wide allocate capability.
///
/// Overwrites any previous registration.
pub fn register_allocate(allocate: AllocateFn) {
    trace!("registering allocate capability");
    registry().lock_write().allocate = Some(allocate);
}

/// Registers the process-wide deallocate capability.
///
/// Overwrites any previous registration.
pub fn register_deallocate(deallocate: DeallocateFn) {
    trace!("registering deallocate capability");
    registry().lock_write().deallocate = Some(deallocate);
}

/// Clears both process-wide registrations.
pub fn reset_registry() {
    trace!("clearing allocator registrations");
    *registry().lock_write() = Capabilities::default();
}
