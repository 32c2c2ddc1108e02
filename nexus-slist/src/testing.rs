//! Counting and failing capabilities for unit tests.
//!
//! Counters are thread-local, and the test harness runs each test on its
//! own thread, so tests never observe each other's allocations.

use std::cell::Cell;
use std::ffi::c_void;

use crate::Capabilities;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
    static DEALLOCATIONS: Cell<usize> = const { Cell::new(0) };
    static BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
}

unsafe extern "C" fn counting_allocate(size: usize) -> *mut c_void {
    let exhausted = BUDGET.with(|budget| match budget.get() {
        Some(0) => true,
        Some(n) => {
            budget.set(Some(n - 1));
            false
        }
        None => false,
    });
    if exhausted {
        return std::ptr::null_mut();
    }

    ALLOCATIONS.with(|c| c.set(c.get() + 1));
    unsafe { libc::malloc(size) }.cast()
}

unsafe extern "C" fn counting_deallocate(ptr: *mut c_void) {
    DEALLOCATIONS.with(|c| c.set(c.get() + 1));
    unsafe { libc::free(ptr.cast()) }
}

/// Hands out memory one byte past a `malloc` result.
unsafe extern "C" fn misaligned_allocate(size: usize) -> *mut c_void {
    ALLOCATIONS.with(|c| c.set(c.get() + 1));
    let base = unsafe { libc::malloc(size + 1) }.cast::<u8>();
    unsafe { base.add(1) }.cast()
}

unsafe extern "C" fn misaligned_deallocate(ptr: *mut c_void) {
    DEALLOCATIONS.with(|c| c.set(c.get() + 1));
    unsafe { libc::free(ptr.cast::<u8>().sub(1).cast()) }
}

pub(crate) unsafe extern "C" fn failing_allocate(_size: usize) -> *mut c_void {
    std::ptr::null_mut()
}

/// Binding that counts every call made on this thread.
pub(crate) fn counting() -> Capabilities {
    reset();
    Capabilities::new(counting_allocate, counting_deallocate)
}

/// Binding with only the counting allocate half.
pub(crate) fn allocate_only() -> Capabilities {
    reset();
    Capabilities::default().with_allocate(counting_allocate)
}

/// Binding with only the counting deallocate half.
pub(crate) fn deallocate_only() -> Capabilities {
    reset();
    Capabilities::default().with_deallocate(counting_deallocate)
}

/// Binding whose allocations are never aligned for anything wider than a
/// byte.
pub(crate) fn misaligned() -> Capabilities {
    reset();
    Capabilities::new(misaligned_allocate, misaligned_deallocate)
}

/// Lets the next `n` allocations succeed, then fails the rest.
pub(crate) fn set_budget(n: usize) {
    BUDGET.with(|b| b.set(Some(n)));
}

pub(crate) fn allocations() -> usize {
    ALLOCATIONS.with(Cell::get)
}

pub(crate) fn deallocations() -> usize {
    DEALLOCATIONS.with(Cell::get)
}

/// Allocations not yet released.
pub(crate) fn live() -> usize {
    allocations() - deallocations()
}

pub(crate) fn reset() {
    ALLOCATIONS.with(|c| c.set(0));
    DEALLOCATIONS.with(|c| c.set(0));
    BUDGET.with(|b| b.set(None));
}
