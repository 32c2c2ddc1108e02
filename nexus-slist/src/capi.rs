//! C ABI over the process-wide binding.
//!
//! Handles are opaque pointers. Every function accepts null handles and
//! reports failure instead of crashing:
//!
//! - `bool` results: `false` on any failure
//! - index/count results: [`NEXUS_SLIST_INVALID`] (`SIZE_MAX`) on failure,
//!   so `0` always means a valid empty list or first position
//!
//! # Cursors
//!
//! A cursor handle records the node it stands on, never the list. Reading
//! its data or index and deleting it only touch the cursor record, so they
//! stay valid after the list is mutated or deleted. Such a cursor is
//! stale: advancing it after its current node was removed, or after the
//! list was deleted, is undefined behaviour. A deleted handle must not be
//! used again.

use std::ptr::{self, NonNull};

use tracing::debug;

use crate::alloc::{self, AllocateFn, DeallocateFn};
use crate::block::Block;
use crate::node::Node;
use crate::{Allocator, List, ListError, ListHeader, Registered};

/// Opaque list handle.
pub type RawList = ListHeader<Registered>;

/// Opaque cursor handle.
pub struct RawCursor {
    node: Option<NonNull<Node>>,
    index: usize,
    data: u32,
}

impl RawCursor {
    /// # Safety
    ///
    /// The current node, if any, must still be linked into a live list.
    unsafe fn advance(&mut self) -> Result<(), ListError> {
        let node = self.node.ok_or(ListError::Exhausted)?;

        // Safety: caller guarantees the node is still alive.
        self.node = unsafe { node.as_ref() }.next.as_ref().map(Block::as_ptr);
        let next = self.node.ok_or(ListError::Exhausted)?;

        self.index += 1;
        // Safety: `next` is owned by the still-live current node.
        self.data = unsafe { next.as_ref() }.data;
        Ok(())
    }

    fn data(&self) -> Option<u32> {
        self.node.map(|_| self.data)
    }
}

/// Returned by size/find/index queries that fail.
pub const NEXUS_SLIST_INVALID: usize = usize::MAX;

/// Flattens a result to the C success flag, logging the reason on failure.
fn report<T>(op: &'static str, result: Result<T, ListError>) -> bool {
    match result {
        Ok(_) => true,
        Err(error) => {
            debug!(op, %error, "rejected");
            false
        }
    }
}

/// # Safety
///
/// `list` must be null or a live handle from [`nexus_slist_create`].
unsafe fn list_mut<'a>(list: *mut RawList) -> Result<&'a mut RawList, ListError> {
    // Safety: caller guarantees a null or live handle.
    unsafe { list.as_mut() }.ok_or(ListError::InvalidHandle)
}

// =============================================================================
// Registration
// =============================================================================

/// Registers the allocate capability. Fails on null.
#[unsafe(no_mangle)]
pub extern "C" fn nexus_slist_register_allocate(allocate: Option<AllocateFn>) -> bool {
    match allocate {
        Some(allocate) => {
            alloc::register_allocate(allocate);
            true
        }
        None => {
            debug!(op = "register_allocate", "null function rejected");
            false
        }
    }
}

/// Registers the deallocate capability. Fails on null.
#[unsafe(no_mangle)]
pub extern "C" fn nexus_slist_register_deallocate(deallocate: Option<DeallocateFn>) -> bool {
    match deallocate {
        Some(deallocate) => {
            alloc::register_deallocate(deallocate);
            true
        }
        None => {
            debug!(op = "register_deallocate", "null function rejected");
            false
        }
    }
}

// =============================================================================
// List
// =============================================================================

/// Creates an empty list. Null if allocate is unregistered or fails.
#[unsafe(no_mangle)]
pub extern "C" fn nexus_slist_create() -> *mut RawList {
    match List::new() {
        Ok(list) => list.into_raw().as_ptr(),
        Err(error) => {
            debug!(op = "create", %error, "rejected");
            ptr::null_mut()
        }
    }
}

/// Releases every node and the list itself.
///
/// On failure (null handle, deallocate unregistered) the handle stays valid.
///
/// # Safety
///
/// `list` must be null or a live handle. Cursors over it become stale.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_delete(list: *mut RawList) -> bool {
    let result = NonNull::new(list)
        .ok_or(ListError::InvalidHandle)
        .and_then(|list| {
            Registered.require_deallocate()?;
            // Safety: caller guarantees a live handle from create.
            unsafe { List::from_raw(list) }.delete()
        });
    report("delete", result)
}

/// Returns the number of values, or [`NEXUS_SLIST_INVALID`] for null.
///
/// # Safety
///
/// `list` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_size(list: *const RawList) -> usize {
    // Safety: caller guarantees a null or live handle.
    match unsafe { list.as_ref() } {
        Some(list) => list.len(),
        None => NEXUS_SLIST_INVALID,
    }
}

/// Appends `value`.
///
/// # Safety
///
/// `list` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_insert_end(list: *mut RawList, value: u32) -> bool {
    let result = unsafe { list_mut(list) }.and_then(|list| list.push_back(value));
    report("insert_end", result)
}

/// Prepends `value`.
///
/// # Safety
///
/// `list` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_insert_front(list: *mut RawList, value: u32) -> bool {
    let result = unsafe { list_mut(list) }.and_then(|list| list.push_front(value));
    report("insert_front", result)
}

/// Inserts `value` at `index` (`0..=size`).
///
/// # Safety
///
/// `list` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_insert(list: *mut RawList, index: usize, value: u32) -> bool {
    let result = unsafe { list_mut(list) }.and_then(|list| list.insert(index, value));
    report("insert", result)
}

/// Returns the index of the first `value`, or [`NEXUS_SLIST_INVALID`].
///
/// # Safety
///
/// `list` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_find(list: *const RawList, value: u32) -> usize {
    // Safety: caller guarantees a null or live handle.
    unsafe { list.as_ref() }
        .and_then(|list| list.find(value))
        .unwrap_or(NEXUS_SLIST_INVALID)
}

/// Removes the value at `index`.
///
/// # Safety
///
/// `list` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_remove(list: *mut RawList, index: usize) -> bool {
    let result = unsafe { list_mut(list) }.and_then(|list| list.remove(index));
    report("remove", result)
}

// =============================================================================
// Cursor
// =============================================================================

/// Creates a cursor at `index`. Null on failure.
///
/// # Safety
///
/// `list` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_cursor_create(
    list: *const RawList,
    index: usize,
) -> *mut RawCursor {
    // Safety: caller guarantees a null or live handle.
    let result = unsafe { list.as_ref() }
        .ok_or(ListError::InvalidHandle)
        .and_then(|list| {
            let allocate = list.allocator().require_allocate()?;
            let node = list.node_ptr(index).ok_or(ListError::OutOfRange { index })?;
            // Safety: the node was just reached through the live list.
            let data = unsafe { node.as_ref() }.data;

            let cursor = RawCursor {
                node: Some(node),
                index,
                data,
            };
            Block::new(allocate, list.allocator().deallocate_fn(), cursor)
        });

    match result {
        Ok(cursor) => cursor.into_raw().as_ptr(),
        Err(error) => {
            debug!(op = "cursor_create", %error, "rejected");
            ptr::null_mut()
        }
    }
}

/// Releases a cursor. Never touches the list, which may already be gone.
///
/// On failure (null handle, deallocate unregistered) the handle stays valid.
///
/// # Safety
///
/// `cursor` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_cursor_delete(cursor: *mut RawCursor) -> bool {
    let result = NonNull::new(cursor)
        .ok_or(ListError::InvalidHandle)
        .and_then(|cursor| {
            let deallocate = Registered.require_deallocate()?;
            // Safety: caller guarantees a live handle from cursor_create,
            // allocated through the registered binding.
            unsafe { Block::from_raw(cursor).release(deallocate) };
            Ok(())
        });
    report("cursor_delete", result)
}

/// Moves to the next node. `false` when the cursor is or becomes exhausted.
///
/// # Safety
///
/// `cursor` must be null or a live handle whose current node has not been
/// removed and whose list has not been deleted.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_cursor_advance(cursor: *mut RawCursor) -> bool {
    // Safety: caller guarantees a null or live, non-stale handle.
    let result = unsafe { cursor.as_mut() }
        .ok_or(ListError::InvalidHandle)
        .and_then(|cursor| unsafe { cursor.advance() });
    report("cursor_advance", result)
}

/// Writes the current value to `out`. `false` if exhausted or null.
///
/// # Safety
///
/// `cursor` must be null or a live handle; `out` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_cursor_data(cursor: *const RawCursor, out: *mut u32) -> bool {
    // Safety: caller guarantees null or valid pointers.
    let (Some(cursor), Some(out)) = (unsafe { cursor.as_ref() }, unsafe { out.as_mut() }) else {
        return report::<()>("cursor_data", Err(ListError::InvalidHandle));
    };
    match cursor.data() {
        Some(data) => {
            *out = data;
            true
        }
        None => report::<()>("cursor_data", Err(ListError::Exhausted)),
    }
}

/// Returns the cursor's index, or [`NEXUS_SLIST_INVALID`] for null.
///
/// # Safety
///
/// `cursor` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nexus_slist_cursor_index(cursor: *const RawCursor) -> usize {
    // Safety: caller guarantees a null or live handle.
    match unsafe { cursor.as_ref() } {
        Some(cursor) => cursor.index,
        None => NEXUS_SLIST_INVALID,
    }
}
