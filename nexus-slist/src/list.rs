//! Singly-linked list of `u32` values over a pluggable allocator.
//!
//! The list is a chain of nodes, each exclusively owning its successor.
//! The header that owns the head link is itself allocated through the
//! binding, so a list of N values holds N + 1 allocations.
//!
//! # Example
//!
//! ```
//! use nexus_slist::{Capabilities, List};
//!
//! let mut list = List::new_in(Capabilities::system()).unwrap();
//!
//! list.push_front(5).unwrap();
//! list.push_back(10).unwrap();
//! list.push_back(15).unwrap();
//! assert_eq!(list.iter().collect::<Vec<_>>(), vec![5, 10, 15]);
//!
//! assert_eq!(list.find(10), Some(1));
//! assert_eq!(list.remove(0), Ok(5));
//! assert_eq!(list.len(), 2);
//!
//! list.delete().unwrap();
//! ```
//!
//! # Positional Semantics
//!
//! | Call | Outcome |
//! |------|---------|
//! | `insert(0, v)` | same as `push_front(v)` |
//! | `insert(len, v)` | appends |
//! | `insert(len + 1, v)` | `OutOfRange`, list unchanged |
//! | `remove(0)` | removes head |
//! | `remove(i)` with `i >= len` | `OutOfRange` |
//!
//! Out-of-range checks happen before anything is allocated.
//!
//! # Teardown
//!
//! [`List::delete`] releases every node and then the header, reporting a
//! missing deallocate capability as an error. Dropping a list does the same
//! teardown; if deallocate is unbound at that point the memory is leaked
//! and a warning is logged.

use core::fmt;
use core::iter::FusedIterator;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use tracing::warn;

use crate::alloc::DeallocateFn;
use crate::block::Block;
use crate::node::{Link, Node, Nodes};
use crate::{Allocator, Cursor, ListError, Registered};

/// The allocated part of a list: its binding and the head link.
///
/// All list operations live here. [`List`] owns one of these and derefs
/// to it; the C ABI passes it around as an opaque pointer.
pub struct ListHeader<A: Allocator = Registered> {
    alloc: A,
    head: Link,
}

/// Owning handle to a singly-linked list.
///
/// # Example
///
/// ```
/// use nexus_slist::{Capabilities, List};
///
/// let mut list = List::new_in(Capabilities::system()).unwrap();
/// list.insert(0, 1).unwrap();
/// list.insert(1, 3).unwrap();
/// list.insert(1, 2).unwrap();
///
/// assert_eq!(list.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
/// assert!(list.insert(5, 9).is_err());
/// ```
pub struct List<A: Allocator = Registered> {
    header: Block<ListHeader<A>>,
}

// =============================================================================
// Lifecycle
// =============================================================================

impl List<Registered> {
    /// Creates an empty list using the process-wide registration.
    ///
    /// # Errors
    ///
    /// `Unconfigured` if no allocate capability is registered,
    /// `AllocationFailed` if it returns null.
    pub fn new() -> Result<Self, ListError> {
        Self::new_in(Registered)
    }
}

impl<A: Allocator> List<A> {
    /// Creates an empty list that allocates through `alloc`.
    ///
    /// # Errors
    ///
    /// `Unconfigured` if `alloc` has no allocate capability,
    /// `AllocationFailed` if it returns null.
    pub fn new_in(alloc: A) -> Result<Self, ListError> {
        let allocate = alloc.require_allocate()?;
        let deallocate = alloc.deallocate_fn();
        let header = Block::new(allocate, deallocate, ListHeader { alloc, head: None })?;
        Ok(Self { header })
    }

    /// Releases every node, then the header.
    ///
    /// # Errors
    ///
    /// `Unconfigured` if the binding has no deallocate capability. The list
    /// is still consumed and its memory leaked.
    pub fn delete(self) -> Result<(), ListError> {
        let deallocate = self.header.alloc.require_deallocate()?;
        let this = ManuallyDrop::new(self);
        // Safety: `this` is never touched again, so the header is moved
        // out exactly once.
        let header = unsafe { ptr::read(&this.header) };
        // Safety: every block in the list came from this binding.
        unsafe { teardown(header, deallocate) };
        Ok(())
    }

    /// Gives up ownership, returning the header pointer.
    ///
    /// Reclaim it with [`List::from_raw`] to release the memory.
    #[inline]
    pub fn into_raw(self) -> NonNull<ListHeader<A>> {
        let this = ManuallyDrop::new(self);
        // Safety: `this` is never touched again.
        unsafe { ptr::read(&this.header) }.into_raw()
    }

    /// Reclaims a header pointer from [`List::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_raw` with the same `A`, must not be
    /// reclaimed twice, and no cursor over it may be alive.
    #[inline]
    pub unsafe fn from_raw(ptr: NonNull<ListHeader<A>>) -> Self {
        Self {
            header: unsafe { Block::from_raw(ptr) },
        }
    }
}

impl<A: Allocator> Deref for List<A> {
    type Target = ListHeader<A>;

    #[inline]
    fn deref(&self) -> &ListHeader<A> {
        &self.header
    }
}

impl<A: Allocator> DerefMut for List<A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut ListHeader<A> {
        &mut self.header
    }
}

impl<A: Allocator> Drop for List<A> {
    fn drop(&mut self) {
        match self.header.alloc.deallocate_fn() {
            Some(deallocate) => {
                // Safety: the header is not used after drop.
                let header = unsafe { ptr::read(&self.header) };
                // Safety: every block in the list came from this binding.
                unsafe { teardown(header, deallocate) };
            }
            None => warn!("deallocate capability not registered, leaking list"),
        }
    }
}

impl<A: Allocator> fmt::Debug for List<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Releases every node and then the header. Returns the node count.
///
/// # Safety
///
/// `deallocate` must pair with the allocate that produced every block.
unsafe fn teardown<A: Allocator>(
    mut header: Block<ListHeader<A>>,
    deallocate: DeallocateFn,
) -> usize {
    let released = unsafe { release_chain(header.head.take(), deallocate) };
    unsafe { header.release(deallocate) };
    released
}

/// Releases a chain front to back, iteratively.
///
/// # Safety
///
/// `deallocate` must pair with the allocate that produced every node.
unsafe fn release_chain(mut link: Link, deallocate: DeallocateFn) -> usize {
    let mut released = 0;
    while let Some(node) = link {
        link = unsafe { node.release(deallocate) }.next;
        released += 1;
    }
    released
}

// =============================================================================
// Operations
// =============================================================================

impl<A: Allocator> ListHeader<A> {
    /// Returns the allocator binding.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the number of values. Walks the whole chain.
    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    /// Returns `true` if the list holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the first value.
    #[inline]
    pub fn front(&self) -> Option<u32> {
        self.head.as_deref().map(|node| node.data)
    }

    /// Returns the value at `index`.
    pub fn get(&self, index: usize) -> Option<u32> {
        self.nodes().nth(index).map(|node| node.data)
    }

    /// Returns the index of the first node holding `value`.
    pub fn find(&self, value: u32) -> Option<usize> {
        self.iter().position(|data| data == value)
    }

    /// Inserts `value` as the new head. O(1).
    ///
    /// # Errors
    ///
    /// `Unconfigured` or `AllocationFailed`.
    pub fn push_front(&mut self, value: u32) -> Result<(), ListError> {
        let allocate = self.alloc.require_allocate()?;
        let mut node = Block::new(allocate, self.alloc.deallocate_fn(), Node::new(value))?;
        node.next = self.head.take();
        self.head = Some(node);
        Ok(())
    }

    /// Appends `value` after the last node. O(n): there is no tail link.
    ///
    /// # Errors
    ///
    /// `Unconfigured` or `AllocationFailed`.
    pub fn push_back(&mut self, value: u32) -> Result<(), ListError> {
        let allocate = self.alloc.require_allocate()?;
        let node = Block::new(allocate, self.alloc.deallocate_fn(), Node::new(value))?;

        let mut link = &mut self.head;
        while let Some(tail) = link {
            link = &mut tail.next;
        }
        *link = Some(node);
        Ok(())
    }

    /// Inserts `value` so that it ends up at `index`.
    ///
    /// `index == 0` behaves like [`push_front`](Self::push_front) and
    /// `index == len` appends.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `index > len`, otherwise `Unconfigured` or
    /// `AllocationFailed`. The list is unchanged on error.
    pub fn insert(&mut self, index: usize, value: u32) -> Result<(), ListError> {
        if index == 0 {
            return self.push_front(value);
        }

        let allocate = self.alloc.require_allocate()?;
        let deallocate = self.alloc.deallocate_fn();
        let link = self.link_at(index).ok_or(ListError::OutOfRange { index })?;

        let mut node = Block::new(allocate, deallocate, Node::new(value))?;
        node.next = link.take();
        *link = Some(node);
        Ok(())
    }

    /// Removes the node at `index`, returning its value.
    ///
    /// # Errors
    ///
    /// `Unconfigured` if deallocate is unbound, `OutOfRange` if the list is
    /// empty or `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<u32, ListError> {
        let deallocate = self.alloc.require_deallocate()?;
        let link = self.link_at(index).ok_or(ListError::OutOfRange { index })?;
        let node = link.take().ok_or(ListError::OutOfRange { index })?;

        // Safety: the node was allocated through this binding.
        let Node { data, next } = unsafe { node.release(deallocate) };
        *link = next;
        Ok(data)
    }

    /// Releases every node, keeping the header. Returns how many were
    /// released.
    ///
    /// # Errors
    ///
    /// `Unconfigured` if deallocate is unbound. Nothing is released.
    pub fn clear(&mut self) -> Result<usize, ListError> {
        let deallocate = self.alloc.require_deallocate()?;
        // Safety: every node was allocated through this binding.
        Ok(unsafe { release_chain(self.head.take(), deallocate) })
    }

    /// Returns a cursor positioned at `index`.
    ///
    /// The cursor borrows the list, so the list cannot change while the
    /// cursor is alive.
    ///
    /// # Errors
    ///
    /// `Unconfigured`, `OutOfRange` if `index >= len`, or
    /// `AllocationFailed`.
    #[inline]
    pub fn cursor(&self, index: usize) -> Result<Cursor<'_, A>, ListError> {
        Cursor::new(self, index)
    }

    /// Returns an iterator over the values, front to back.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: self.nodes(),
        }
    }

    /// Swaps the binding of a live list.
    #[cfg(test)]
    pub(crate) fn rebind(&mut self, alloc: A) {
        self.alloc = alloc;
    }

    #[inline]
    pub(crate) fn nodes(&self) -> Nodes<'_> {
        Nodes::new(&self.head)
    }

    /// Returns the owning pointer of the node at `index`, for holders that
    /// cannot keep a borrow of the list.
    #[cfg(feature = "capi")]
    pub(crate) fn node_ptr(&self, index: usize) -> Option<NonNull<Node>> {
        let mut block = self.head.as_ref()?;
        for _ in 0..index {
            block = block.next.as_ref()?;
        }
        Some(block.as_ptr())
    }

    /// Returns the link reached after `hops` steps from the head: the head
    /// link itself for 0, otherwise the `next` link of node `hops - 1`.
    ///
    /// `None` if the chain ends first.
    fn link_at(&mut self, hops: usize) -> Option<&mut Link> {
        let mut link = &mut self.head;
        for _ in 0..hops {
            link = &mut link.as_mut()?.next;
        }
        Some(link)
    }
}

impl<A: Allocator> fmt::Debug for ListHeader<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, A: Allocator> IntoIterator for &'a ListHeader<A> {
    type Item = u32;
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<'a, A: Allocator> IntoIterator for &'a List<A> {
    type Item = u32;
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over list values, front to back.
#[derive(Clone)]
pub struct Iter<'a> {
    nodes: Nodes<'a>,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        self.nodes.next().map(|node| node.data)
    }
}

impl FusedIterator for Iter<'_> {}
