//! Iterative depth-first traversal over any [`Navigator`].
//!
//! A [`Traversal`] keeps the walk from the declared root to the current node as an
//! explicit [`PathStack`] instead of recursing, so it can stop after every element
//! and resume on the next pull. Two directions are provided:
//!
//! *   [`Forward`]: pre-order, a node before its children, children left to right.
//! *   [`Inverse`]: the exact reverse of [`Forward`].
//!
//! Pulling is split in two steps, [`Traversal::has_next`] and
//! [`Traversal::take_next`]. The state machine only moves past a node once it has
//! been taken and the next one is asked for. [`Traversal`] is also an [`Iterator`],
//! which is the usual way to consume it.
//!
//! Using the tree
//! ```text
//!        1
//!      /   \
//!     2     5
//!    / \
//!   3   4
//! ```
//! a forward traversal from `1` yields `1 2 3 4 5`, an inverse one yields
//! `5 4 3 2 1`. Starting at `2`, forward yields `2 3 4` and inverse `2 1`.

use std::{iter::FusedIterator, marker::PhantomData};

use thiserror::Error;

use crate::navigate::Navigator;

pub mod direction;
pub mod path;

pub use direction::{Direction, Forward, Inverse};
pub use path::{PathEntry, PathStack};

/// Errors raised by the pull protocol and by traversal construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TraversalError {
    #[error("Start node is not a descendant of the declared root")]
    InvalidStart,
    #[error("Navigator reported a parent but no child index")]
    MissingChildIndex,
    #[error("Traversal is exhausted")]
    Exhausted,
}

/// A pull-based depth-first traversal in direction `D`.
pub struct Traversal<Nav: Navigator, D> {
    navigator: Nav,
    path: PathStack<Nav::Node>,
    /// Whether the top of `path` has already been handed out.
    yielded: bool,
    direction: PhantomData<D>,
}

/// Pre-order traversal.
pub type Preorder<Nav> = Traversal<Nav, Forward>;

/// Reverse pre-order traversal.
pub type InversePreorder<Nav> = Traversal<Nav, Inverse>;

impl<Nav: Navigator, D: Direction> Traversal<Nav, D> {
    /// Traverses the whole tree below `root`.
    pub fn new(navigator: Nav, root: Nav::Node) -> Self {
        let mut path = PathStack::rooted(root);
        D::seat(&mut path, &navigator);
        Traversal {
            navigator,
            path,
            yielded: false,
            direction: PhantomData,
        }
    }

    /// Traverses from `start`, which must be `root` or one of its descendants.
    ///
    /// The first element produced is `start`. Going forward the traversal then
    /// covers the subtree of `start`; going backwards it covers every node that
    /// precedes `start` in pre-order below `root`.
    pub fn starting_at(
        navigator: Nav,
        root: Nav::Node,
        start: Nav::Node,
    ) -> Result<Self, TraversalError> {
        let path = PathStack::reconstruct(&navigator, root, start)?;
        Ok(Traversal {
            navigator,
            path,
            yielded: false,
            direction: PhantomData,
        })
    }

    pub fn has_next(&mut self) -> bool {
        self.settle();
        !self.path.is_empty()
    }

    /// Takes the next node, failing with [`TraversalError::Exhausted`] once the
    /// traversal is over.
    pub fn take_next(&mut self) -> Result<Nav::Node, TraversalError> {
        self.settle();
        let node = self
            .path
            .top_node()
            .cloned()
            .ok_or(TraversalError::Exhausted)?;
        self.yielded = true;
        Ok(node)
    }

    /// The chain from the declared root to the node most recently taken (or about
    /// to be taken). Empty once exhausted.
    pub fn path(&self) -> &[PathEntry<Nav::Node>] {
        self.path.as_slice()
    }

    /// Depth of the current node below the declared root.
    pub fn depth(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }

    pub fn navigator(&self) -> &Nav {
        &self.navigator
    }

    fn settle(&mut self) {
        if self.yielded && !self.path.is_empty() {
            D::advance(&mut self.path, &self.navigator);
            self.yielded = false;
        }
    }
}

impl<Nav: Navigator, D: Direction> Iterator for Traversal<Nav, D> {
    type Item = Nav::Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.take_next().ok()
    }
}

impl<Nav: Navigator, D: Direction> FusedIterator for Traversal<Nav, D> {}
