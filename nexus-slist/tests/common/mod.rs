//! Counting capabilities shared by the integration tests.
//!
//! Counters are thread-local. Registered functions are called on the
//! thread that runs the test, so the same counters work for both injected
//! and process-wide bindings.

#![allow(dead_code)]

use std::cell::Cell;
use std::ffi::c_void;

use nexus_slist::{Capabilities, register_allocate, register_deallocate, reset_registry};

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
    static DEALLOCATIONS: Cell<usize> = const { Cell::new(0) };
    static FAIL_NEXT: Cell<bool> = const { Cell::new(false) };
}

pub unsafe extern "C" fn count_alloc(size: usize) -> *mut c_void {
    if FAIL_NEXT.with(|f| f.replace(false)) {
        return std::ptr::null_mut();
    }
    ALLOCATIONS.with(|c| c.set(c.get() + 1));
    unsafe { libc::malloc(size) }.cast()
}

pub unsafe extern "C" fn count_free(ptr: *mut c_void) {
    DEALLOCATIONS.with(|c| c.set(c.get() + 1));
    unsafe { libc::free(ptr.cast()) }
}

/// Injected binding over the counting functions.
pub fn counting() -> Capabilities {
    reset();
    Capabilities::new(count_alloc, count_free)
}

/// Registers the counting functions process-wide.
pub fn register_counting() {
    reset_registry();
    reset();
    register_allocate(count_alloc);
    register_deallocate(count_free);
}

/// Makes the next allocation return null.
pub fn fail_next() {
    FAIL_NEXT.with(|f| f.set(true));
}

pub fn allocations() -> usize {
    ALLOCATIONS.with(Cell::get)
}

pub fn deallocations() -> usize {
    DEALLOCATIONS.with(Cell::get)
}

pub fn live() -> usize {
    allocations() - deallocations()
}

pub fn reset() {
    ALLOCATIONS.with(|c| c.set(0));
    DEALLOCATIONS.with(|c| c.set(0));
    FAIL_NEXT.with(|f| f.set(false));
}
