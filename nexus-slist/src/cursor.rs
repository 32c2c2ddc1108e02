//! External cursor over a list.
//!
//! A cursor records a position in a list and the value cached from it. It
//! never owns nodes; its own record is allocated through the list's binding
//! and released by [`Cursor::delete`] or on drop.
//!
//! # States
//!
//! ```text
//!            advance (successor exists)
//!              ┌──────────┐
//!              ▼          │
//! new ──► Positioned ─────┘
//!              │
//!              │ advance (no successor)
//!              ▼
//!          Exhausted  ── advance ──► Err(Exhausted)
//! ```
//!
//! # Example
//!
//! ```
//! use nexus_slist::{Capabilities, List, ListError};
//!
//! let mut list = List::new_in(Capabilities::system()).unwrap();
//! for v in [10, 20, 30] {
//!     list.push_back(v).unwrap();
//! }
//!
//! let mut cursor = list.cursor(1).unwrap();
//! assert_eq!(cursor.data(), Some(20));
//!
//! cursor.advance().unwrap();
//! assert_eq!((cursor.index(), cursor.data()), (2, Some(30)));
//!
//! assert_eq!(cursor.advance(), Err(ListError::Exhausted));
//! assert!(cursor.is_exhausted());
//! cursor.delete().unwrap();
//! ```
//!
//! The cursor borrows its list, so mutating the list while a cursor is
//! alive does not compile. Only the C ABI can observe a stale cursor.

use core::fmt;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use tracing::warn;

use crate::block::Block;
use crate::list::ListHeader;
use crate::node::Node;
use crate::{Allocator, ListError, Registered};

/// The allocated part of a cursor: list reference, position and cached
/// value.
pub struct CursorState<'a, A: Allocator = Registered> {
    list: &'a ListHeader<A>,
    node: Option<&'a Node>,
    index: usize,
    data: u32,
}

/// Owning handle to a cursor over a list.
pub struct Cursor<'a, A: Allocator = Registered> {
    state: Block<CursorState<'a, A>>,
}

impl<'a, A: Allocator> Cursor<'a, A> {
    /// Positions a new cursor on the node at `index`.
    pub(crate) fn new(list: &'a ListHeader<A>, index: usize) -> Result<Self, ListError> {
        let allocate = list.allocator().require_allocate()?;
        let deallocate = list.allocator().deallocate_fn();
        let node = list
            .nodes()
            .nth(index)
            .ok_or(ListError::OutOfRange { index })?;

        let state = Block::new(
            allocate,
            deallocate,
            CursorState {
                list,
                node: Some(node),
                index,
                data: node.data,
            },
        )?;
        Ok(Self { state })
    }

    /// Releases the cursor record. The list is untouched.
    ///
    /// # Errors
    ///
    /// `Unconfigured` if the list's binding has no deallocate capability.
    /// The cursor is still consumed and its record leaked.
    pub fn delete(self) -> Result<(), ListError> {
        let deallocate = self.state.list.allocator().require_deallocate()?;
        let this = ManuallyDrop::new(self);
        // Safety: `this` is never touched again.
        let state = unsafe { ptr::read(&this.state) };
        // Safety: the record was allocated through the list's binding.
        unsafe { state.release(deallocate) };
        Ok(())
    }

    /// Gives up ownership, returning the record pointer.
    #[inline]
    pub fn into_raw(self) -> NonNull<CursorState<'a, A>> {
        let this = ManuallyDrop::new(self);
        // Safety: `this` is never touched again.
        unsafe { ptr::read(&this.state) }.into_raw()
    }

    /// Reclaims a record pointer from [`Cursor::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_raw`, must not be reclaimed twice, and the
    /// list it references must still be alive.
    #[inline]
    pub unsafe fn from_raw(ptr: NonNull<CursorState<'a, A>>) -> Self {
        Self {
            state: unsafe { Block::from_raw(ptr) },
        }
    }
}

impl<'a, A: Allocator> Deref for Cursor<'a, A> {
    type Target = CursorState<'a, A>;

    #[inline]
    fn deref(&self) -> &CursorState<'a, A> {
        &self.state
    }
}

impl<A: Allocator> DerefMut for Cursor<'_, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl<A: Allocator> Drop for Cursor<'_, A> {
    fn drop(&mut self) {
        match self.state.list.allocator().deallocate_fn() {
            Some(deallocate) => {
                // Safety: the record is not used after drop.
                let state = unsafe { ptr::read(&self.state) };
                // Safety: the record was allocated through the list's binding.
                unsafe { state.release(deallocate) };
            }
            None => warn!("deallocate capability not registered, leaking cursor"),
        }
    }
}

impl<A: Allocator> fmt::Debug for Cursor<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

// =============================================================================
// Navigation
// =============================================================================

impl<'a, A: Allocator> CursorState<'a, A> {
    /// Moves to the next node.
    ///
    /// Stepping off the last node exhausts the cursor and reports
    /// `Exhausted`; every later call does too.
    pub fn advance(&mut self) -> Result<(), ListError> {
        let node = self.node.ok_or(ListError::Exhausted)?;

        self.node = node.next.as_deref();
        let next = self.node.ok_or(ListError::Exhausted)?;

        self.index += 1;
        self.data = next.data;
        Ok(())
    }

    /// Returns the value at the current position, or `None` once exhausted.
    #[inline]
    pub fn data(&self) -> Option<u32> {
        self.node.map(|_| self.data)
    }

    /// Returns the index of the current position.
    ///
    /// Once exhausted this stays at the last node's index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` once the cursor has stepped past the last node.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.node.is_none()
    }

    /// Returns the list this cursor walks.
    #[inline]
    pub fn list(&self) -> &'a ListHeader<A> {
        self.list
    }
}

impl<A: Allocator> fmt::Debug for CursorState<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("data", &self.data())
            .finish()
    }
}
