//! The navigation capability consumed by the traversal engine.
//!
//! The engine never looks inside a node. Everything it knows about the shape of
//! the structure it learns through a [`Navigator`]:
//!
//! *   [`Navigator::parent_of`]: the parent of a node, `None` only for the true root.
//! *   [`Navigator::child_index_of`]: the 0-based position of a node among its
//!     siblings, `None` exactly when the node has no parent.
//! *   [`Navigator::child_count_of`]: the number of children of a node.
//! *   [`Navigator::child_at`]: the child at a given position, `None` when out of range.
//!
//! These four must describe a finite, cycle-free, indexable tree. Nothing here
//! checks that; a navigator that reports a cycle makes traversals run forever.
//!
//! Node equality is node identity. Two nodes compare equal only if they are the
//! same node of the structure (an arena index, a pointer compared by address, ...).
//! The engine relies on this when it walks up from a start node looking for the
//! declared root.

use crate::traverse::{Forward, Inverse, Traversal, TraversalError};

/// Read-only navigation over a tree whose node type is opaque to the caller.
pub trait Navigator {
    /// The node handle. `==` must mean "same node".
    type Node: Clone + Eq;

    fn parent_of(&self, node: &Self::Node) -> Option<Self::Node>;

    fn child_index_of(&self, node: &Self::Node) -> Option<usize>;

    fn child_count_of(&self, node: &Self::Node) -> usize;

    fn child_at(&self, node: &Self::Node, index: usize) -> Option<Self::Node>;

    fn is_leaf(&self, node: &Self::Node) -> bool {
        self.child_count_of(node) == 0
    }

    /// The last child of `node` together with its index.
    fn last_child(&self, node: &Self::Node) -> Option<(Self::Node, usize)> {
        let index = self.child_count_of(node).checked_sub(1)?;
        self.child_at(node, index).map(|child| (child, index))
    }

    /// Walks upwards from `start` (inclusive) to the true root.
    fn ancestors(&self, start: Self::Node) -> Ancestors<'_, Self>
    where
        Self: Sized,
    {
        Ancestors::new(self, start)
    }
}

impl<T: Navigator + ?Sized> Navigator for &T {
    type Node = T::Node;

    fn parent_of(&self, node: &Self::Node) -> Option<Self::Node> {
        (**self).parent_of(node)
    }

    fn child_index_of(&self, node: &Self::Node) -> Option<usize> {
        (**self).child_index_of(node)
    }

    fn child_count_of(&self, node: &Self::Node) -> usize {
        (**self).child_count_of(node)
    }

    fn child_at(&self, node: &Self::Node, index: usize) -> Option<Self::Node> {
        (**self).child_at(node, index)
    }
}

/// An iterator that traverses upwards from a starting node to the true root.
pub struct Ancestors<'a, Nav: Navigator> {
    navigator: &'a Nav,
    /// The next node to yield. `None` once the root has been yielded.
    current: Option<Nav::Node>,
}

impl<'a, Nav: Navigator> Ancestors<'a, Nav> {
    pub fn new(navigator: &'a Nav, start: Nav::Node) -> Self {
        Ancestors {
            navigator,
            current: Some(start),
        }
    }
}

impl<Nav: Navigator> Clone for Ancestors<'_, Nav> {
    fn clone(&self) -> Self {
        Self {
            navigator: self.navigator,
            current: self.current.clone(),
        }
    }
}

impl<Nav: Navigator> Iterator for Ancestors<'_, Nav> {
    type Item = Nav::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current.take()?;
        self.current = self.navigator.parent_of(&node);
        Some(node)
    }
}

impl<Nav: Navigator> std::iter::FusedIterator for Ancestors<'_, Nav> {}

/// Builds traversals out of any navigator.
///
/// Implemented for every [`Navigator`], so `forest.preorder(root)` borrows the
/// forest while `SharedNavigator.preorder(root)` moves the zero-sized navigator in.
pub trait Navigate: Navigator + Sized {
    /// Pre-order over the whole tree below `root`.
    fn preorder(&self, root: Self::Node) -> Traversal<&Self, Forward> {
        Traversal::new(self, root)
    }

    /// Pre-order over the subtree of `start`, which must lie below `root`.
    fn preorder_from(
        &self,
        root: Self::Node,
        start: Self::Node,
    ) -> Result<Traversal<&Self, Forward>, TraversalError> {
        Traversal::starting_at(self, root, start)
    }

    /// Reverse pre-order over the whole tree below `root`, ending at `root`.
    fn inverse_preorder(&self, root: Self::Node) -> Traversal<&Self, Inverse> {
        Traversal::new(self, root)
    }

    /// `start` followed by all of its pre-order predecessors below `root`.
    fn inverse_preorder_from(
        &self,
        root: Self::Node,
        start: Self::Node,
    ) -> Result<Traversal<&Self, Inverse>, TraversalError> {
        Traversal::starting_at(self, root, start)
    }
}

impl<Nav: Navigator> Navigate for Nav {}
