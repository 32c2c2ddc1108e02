//! Singly-linked `u32` list with pluggable allocation.
//!
//! Every byte the crate uses (list headers, nodes, cursor records) comes
//! from an allocate capability and goes back through the matching
//! deallocate capability. The host decides what those are.
//!
//! # Design Philosophy
//!
//! ```text
//! Allocator (binding) - supplies allocate/deallocate
//! List                - owns a chain of nodes, one owner per node
//! Cursor              - borrows a list, never owns nodes
//! ```
//!
//! - **Single ownership**: each node is owned by exactly one link, so
//!   teardown is a straight walk and double frees cannot happen
//! - **No hidden failure**: missing capabilities, bad indices and failed
//!   allocations come back as [`ListError`], never as panics
//! - **Borrowed cursors**: a cursor borrows its list, so a list cannot be
//!   changed under a live cursor
//!
//! # Quick Start
//!
//! ```
//! use nexus_slist::{Capabilities, List};
//!
//! // Injected binding: libc malloc/free
//! let mut list = List::new_in(Capabilities::system()).unwrap();
//!
//! list.push_back(10).unwrap();
//! list.push_back(30).unwrap();
//! list.insert(1, 20).unwrap();
//!
//! assert_eq!(list.len(), 3);
//! assert_eq!(list.find(30), Some(2));
//!
//! let mut cursor = list.cursor(0).unwrap();
//! let mut seen = vec![cursor.data().unwrap()];
//! while cursor.advance().is_ok() {
//!     seen.push(cursor.data().unwrap());
//! }
//! assert_eq!(seen, vec![10, 20, 30]);
//! ```
//!
//! # Process-wide Registration
//!
//! Hosts that prefer one global binding register it once at startup and
//! then use [`List::new`]:
//!
//! ```
//! use std::ffi::c_void;
//! use nexus_slist::{List, register_allocate, register_deallocate};
//!
//! unsafe extern "C" fn host_alloc(size: usize) -> *mut c_void {
//!     unsafe { libc::malloc(size) }.cast()
//! }
//!
//! unsafe extern "C" fn host_free(ptr: *mut c_void) {
//!     unsafe { libc::free(ptr.cast()) }
//! }
//!
//! register_allocate(host_alloc);
//! register_deallocate(host_free);
//!
//! let mut list = List::new().unwrap();
//! list.push_front(1).unwrap();
//! list.delete().unwrap();
//! ```
//!
//! # Bindings
//!
//! | Binding | Resolved | Use Case |
//! |---------|----------|----------|
//! | [`Registered`] | on every call | one allocator for the whole process |
//! | [`Capabilities`] | at construction | per-list allocators, tests |
//!
//! # Feature Flags
//!
//! - `capi` (default) - export the C ABI in [`capi`]

#![warn(missing_docs)]

pub mod alloc;
#[cfg(feature = "capi")]
pub mod capi;
pub mod cursor;
pub mod error;
pub mod list;

mod block;
mod node;

#[cfg(test)]
mod testing;

pub use alloc::{
    AllocateFn, Allocator, Capabilities, DeallocateFn, Registered, register_allocate,
    register_deallocate, reset_registry,
};
pub use cursor::{Cursor, CursorState};
pub use error::{Capability, ListError};
pub use list::{Iter, List, ListHeader};
