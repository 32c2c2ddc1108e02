//! Chain storage unit.

use crate::block::Block;

/// Owning link to the rest of the chain. `None` terminates it.
pub(crate) type Link = Option<Block<Node>>;

/// A value plus exclusive ownership of its successor.
pub(crate) struct Node {
    pub(crate) data: u32,
    pub(crate) next: Link,
}

impl Node {
    /// Creates an unlinked node.
    #[inline]
    pub(crate) const fn new(data: u32) -> Self {
        Self { data, next: None }
    }
}

/// Borrowing walk over the nodes of a chain.
#[derive(Clone)]
pub(crate) struct Nodes<'a> {
    next: Option<&'a Node>,
}

impl<'a> Nodes<'a> {
    #[inline]
    pub(crate) fn new(head: &'a Link) -> Self {
        Self {
            next: head.as_deref(),
        }
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Node;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(node)
    }
}
