//! Single owning allocations obtained from an allocate capability.
//!
//! A [`Block`] behaves like a `Box` whose memory came from the binding
//! instead of the global allocator. It has no `Drop`: the owner releases
//! it explicitly, because only the owner knows which deallocate pairs with
//! the allocate that produced it.

use core::mem::size_of;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;

use tracing::debug;

use crate::ListError;
use crate::alloc::{AllocateFn, DeallocateFn};

/// Exclusive owner of one `T` living in binding-provided memory.
pub(crate) struct Block<T> {
    ptr: NonNull<T>,
}

impl<T> Block<T> {
    /// Allocates space for `value` and moves it in.
    ///
    /// Fails if `allocate` returns null or memory not aligned for `T`.
    /// Misaligned memory goes straight back to `deallocate`; it is only
    /// leaked when no deallocate is bound.
    pub(crate) fn new(
        allocate: AllocateFn,
        deallocate: Option<DeallocateFn>,
        value: T,
    ) -> Result<Self, ListError> {
        let size = size_of::<T>().max(1);

        // Safety: the capability contract allows any size.
        let raw = unsafe { allocate(size) };

        let Some(ptr) = NonNull::new(raw.cast::<T>()) else {
            debug!(size, "allocate capability returned null");
            return Err(ListError::AllocationFailed { size });
        };
        if !ptr.as_ptr().is_aligned() {
            debug!(size, "allocate capability returned misaligned memory");
            if let Some(deallocate) = deallocate {
                // Safety: raw came from the paired allocate and holds no value.
                unsafe { deallocate(raw) };
            }
            return Err(ListError::AllocationFailed { size });
        }

        // Safety: ptr is non-null, aligned and at least size_of::<T>() bytes.
        unsafe { ptr.as_ptr().write(value) };
        Ok(Self { ptr })
    }

    /// Moves the value out and hands the memory to `deallocate`.
    ///
    /// # Safety
    ///
    /// `deallocate` must pair with the allocate that produced this block.
    pub(crate) unsafe fn release(self, deallocate: DeallocateFn) -> T {
        // Safety: ptr holds an initialized T owned by self.
        let value = unsafe { self.ptr.as_ptr().read() };
        // Safety: caller guarantees the pairing; self is consumed so the
        // memory is released exactly once.
        unsafe { deallocate(self.ptr.as_ptr().cast()) };
        value
    }

    /// Returns the pointer without giving up ownership.
    #[cfg(feature = "capi")]
    #[inline]
    pub(crate) fn as_ptr(&self) -> NonNull<T> {
        self.ptr
    }

    /// Gives up ownership, returning the raw pointer.
    #[inline]
    pub(crate) fn into_raw(self) -> NonNull<T> {
        self.ptr
    }

    /// Reclaims ownership of a pointer from [`Block::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_raw` and not be reclaimed twice.
    #[inline]
    pub(crate) unsafe fn from_raw(ptr: NonNull<T>) -> Self {
        Self { ptr }
    }
}

impl<T> Deref for Block<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: ptr is valid and initialized for the block's lifetime.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for Block<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // Safety: ptr is valid, and &mut self guarantees exclusivity.
        unsafe { self.ptr.as_mut() }
    }
}
