use crate::navigate::Navigator;

use super::TraversalError;

/// One level of the walk from the declared root down to the current node.
///
/// Only the bottom entry of a path is a [`PathEntry::Root`]: the declared root
/// is the boundary of the traversal, even if the structure continues above it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathEntry<N> {
    Root(N),
    Child { node: N, index: usize },
}

impl<N> PathEntry<N> {
    pub fn child(node: N, index: usize) -> Self {
        PathEntry::Child { node, index }
    }

    pub fn node(&self) -> &N {
        match self {
            PathEntry::Root(node) => node,
            PathEntry::Child { node, .. } => node,
        }
    }

    pub fn into_node(self) -> N {
        match self {
            PathEntry::Root(node) => node,
            PathEntry::Child { node, .. } => node,
        }
    }

    /// Position among the siblings, `None` for the root entry.
    pub fn index(&self) -> Option<usize> {
        match self {
            PathEntry::Root(_) => None,
            PathEntry::Child { index, .. } => Some(*index),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, PathEntry::Root(_))
    }
}

/// The explicit stack standing in for the call stack of a recursive walk.
///
/// Bottom is the declared root, top is the current node. An empty stack means the
/// traversal is over.
#[derive(Clone, Debug)]
pub struct PathStack<N> {
    entries: Vec<PathEntry<N>>,
    /// Length of the path when it was seated on its start node.
    floor: usize,
}

impl<N: Clone + Eq> PathStack<N> {
    pub fn rooted(root: N) -> Self {
        PathStack {
            entries: vec![PathEntry::Root(root)],
            floor: 1,
        }
    }

    /// Rebuilds the root-to-`start` chain by walking parents up from `start`.
    ///
    /// Fails with [`TraversalError::InvalidStart`] if the walk runs out of
    /// parents before meeting `root`.
    pub fn reconstruct<Nav>(navigator: &Nav, root: N, start: N) -> Result<Self, TraversalError>
    where
        Nav: Navigator<Node = N>,
    {
        let mut chain = Vec::new();

        for node in navigator.ancestors(start) {
            if node == root {
                chain.push(PathEntry::Root(node));
                chain.reverse();
                let floor = chain.len();
                return Ok(PathStack {
                    entries: chain,
                    floor,
                });
            }

            match navigator.child_index_of(&node) {
                Some(index) => chain.push(PathEntry::child(node, index)),
                None if navigator.parent_of(&node).is_some() => {
                    return Err(TraversalError::MissingChildIndex)
                }
                None => break,
            }
        }

        Err(TraversalError::InvalidStart)
    }

    pub fn top(&self) -> Option<&PathEntry<N>> {
        self.entries.last()
    }

    pub fn top_node(&self) -> Option<&N> {
        self.top().map(PathEntry::node)
    }

    pub fn push(&mut self, entry: PathEntry<N>) {
        self.entries.push(entry)
    }

    pub fn pop(&mut self) -> Option<PathEntry<N>> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn floor(&self) -> usize {
        self.floor
    }

    pub fn as_slice(&self) -> &[PathEntry<N>] {
        &self.entries
    }

    /// Pushes last children until the top is a leaf.
    pub fn descend_last<Nav>(&mut self, navigator: &Nav)
    where
        Nav: Navigator<Node = N>,
    {
        while let Some((child, index)) = self
            .top_node()
            .and_then(|node| navigator.last_child(node))
        {
            self.push(PathEntry::child(child, index));
        }
    }
}
