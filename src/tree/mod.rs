//! An arena forest whose nodes are addressed by typed ids.
//!
//! Each node stores its data, a pointer to its parent and the ordered list of its
//! children (see [`ChildVecStore`]), which makes it a cheap [`Navigator`]: every
//! navigation query is a vector lookup, except [`Navigator::child_index_of`],
//! which scans the siblings.
//!
//! The core components are:
//! *   [`Forest<R, V>`]: a collection of trees, with data `R` per tree and `V` per node.
//! *   [`TreeNodeId`], [`RootId`], [`ParentId`]: typed identifiers for nodes, trees and parent links.
//! *   [`builder`]: folding flat keyed elements into a forest by shared prefixes.

use std::{
    fmt::Display,
    ops::{Index, IndexMut},
};

use derive_more::{From, Into};
use thiserror::Error;

use crate::navigate::Navigator;

pub mod builder;
pub mod child_vec;

pub use builder::{PrefixForest, PrefixForestBuilder, PrefixNode};
pub use child_vec::{CVNode, ChildVecStore};

/// A type-safe identifier for a node within a `Forest`.
/// Wraps a `usize` index into the underlying node storage vector.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeNodeId(pub(crate) usize);

impl Display for TreeNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A type-safe identifier for a tree within a `Forest`.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootId(pub(crate) usize);

/// Where a node points upwards: either it is the root of a tree, or it has a parent node.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParentId {
    Root(RootId),
    Node(TreeNodeId),
}

impl ParentId {
    pub fn is_root(&self) -> bool {
        match self {
            ParentId::Root(_) => true,
            ParentId::Node(_) => false,
        }
    }

    pub fn node(&self) -> Option<TreeNodeId> {
        match self {
            ParentId::Root(_) => None,
            ParentId::Node(n) => Some(*n),
        }
    }
}

/// Internal data associated with the root of a tree in the `Forest`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootData<R> {
    pub(crate) data: R,
    pub(crate) root_id: TreeNodeId,
}

/// Represents a forest (a collection of disjoint trees).
///
/// `R` is the type of data associated with each tree, `V` the type of data
/// associated with each node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Forest<R, V> {
    pub(crate) nodes: ChildVecStore<V>,
    pub(crate) roots: Vec<RootData<R>>,
}

/// Errors that can occur during forest operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForestError {
    #[error("Invalid TreeNodeId: {0:?}")]
    InvalidNodeId(TreeNodeId),
    #[error("Invalid RootId: {0:?}")]
    InvalidRootId(RootId),
    #[error("Cyclic parent pointers through {0:?}")]
    CyclicParent(TreeNodeId),
    #[error("Parent and child pointers disagree on {0:?}")]
    WrongParent(TreeNodeId),
    #[error("Element {position} has an empty key")]
    EmptyKey { position: usize },
    #[error("Element {position} repeats an earlier key")]
    DuplicateKey { position: usize },
}

impl<R, V> Index<&RootId> for Forest<R, V> {
    type Output = TreeNodeId;
    fn index(&self, index: &RootId) -> &Self::Output {
        &self.roots[index.0].root_id
    }
}

impl<R, V> Index<RootId> for Forest<R, V> {
    type Output = R;
    fn index(&self, index: RootId) -> &Self::Output {
        &self.roots[index.0].data
    }
}

impl<R, V> IndexMut<RootId> for Forest<R, V> {
    fn index_mut(&mut self, index: RootId) -> &mut Self::Output {
        &mut self.roots[index.0].data
    }
}

impl<R, V> Index<&TreeNodeId> for Forest<R, V> {
    type Output = ParentId;
    fn index(&self, index: &TreeNodeId) -> &Self::Output {
        &self.nodes[index]
    }
}

impl<R, V> Index<TreeNodeId> for Forest<R, V> {
    type Output = V;
    fn index(&self, index: TreeNodeId) -> &Self::Output {
        &self.nodes[index]
    }
}

impl<R, V> IndexMut<TreeNodeId> for Forest<R, V> {
    fn index_mut(&mut self, index: TreeNodeId) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

impl<R, V> Default for Forest<R, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, V> Forest<R, V> {
    pub fn new() -> Self {
        Forest {
            nodes: ChildVecStore::default(),
            roots: Vec::new(),
        }
    }

    /// Adds a new root node to the forest, creating a new tree.
    ///
    /// Returns the `TreeNodeId` of the new root node and the `RootId` of the new tree.
    pub fn add_root(&mut self, node_data: V, tree_data: R) -> (TreeNodeId, RootId) {
        let root_id = RootId(self.roots.len());
        let root_node_id = self.nodes.add_root(node_data, root_id);
        self.roots.push(RootData {
            data: tree_data,
            root_id: root_node_id,
        });
        (root_node_id, root_id)
    }

    /// Adds a new node as the *last* child of `parent_id`.
    pub fn add_child(&mut self, parent_id: TreeNodeId, node_data: V) -> TreeNodeId {
        self.nodes.add_child(node_data, parent_id)
    }

    pub fn get(&self, node: TreeNodeId) -> Result<&V, ForestError> {
        self.nodes.get(node)
    }

    pub fn parent(&self, node: TreeNodeId) -> ParentId {
        self.nodes[&node]
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.n_nodes()
    }

    pub fn n_roots(&self) -> usize {
        self.roots.len()
    }

    pub fn iter_roots(&self) -> impl Iterator<Item = (&R, &TreeNodeId)> {
        self.roots.iter().map(|r| (&r.data, &r.root_id))
    }

    pub fn iter_root_ids(&self) -> impl Iterator<Item = RootId> {
        (0..self.roots.len()).map(RootId)
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (TreeNodeId, &V)> {
        self.nodes.iter_nodes()
    }

    pub fn iter_children(&self, node: TreeNodeId) -> impl Iterator<Item = TreeNodeId> + '_ {
        self.nodes.iter_children(node)
    }

    pub fn iter_ancestors(&self, node: TreeNodeId) -> impl Iterator<Item = TreeNodeId> + '_ {
        self.nodes.ancestors(node)
    }

    /// The tree `node` belongs to.
    pub fn root(&self, node: TreeNodeId) -> RootId {
        self.nodes.root(node)
    }

    /// The root node of the tree `root`.
    pub fn root_node(&self, root: RootId) -> Result<TreeNodeId, ForestError> {
        self.roots
            .get(root.0)
            .map(|r| r.root_id)
            .ok_or(ForestError::InvalidRootId(root))
    }

    pub fn map_nodes<F, U>(self, transform: F) -> Forest<R, U>
    where
        F: FnMut(V) -> U,
    {
        Forest {
            nodes: self.nodes.map(transform),
            roots: self.roots,
        }
    }

    pub fn map_nodes_ref<F, U>(&self, transform: F) -> Forest<R, U>
    where
        F: FnMut(&V) -> U,
        R: Clone,
    {
        Forest {
            nodes: self.nodes.map_ref(transform),
            // Clone root data; mapping only affects node data type
            roots: self.roots.clone(),
        }
    }

    /// Checks the node store and that every tree's recorded root node points back at it.
    pub fn validate(&self) -> Result<(), ForestError> {
        for (root, root_id) in self.nodes.validate()? {
            let recorded = self.roots.get(root.0).ok_or(ForestError::InvalidRootId(root))?;
            if recorded.root_id != root_id {
                return Err(ForestError::WrongParent(root_id));
            }
        }
        Ok(())
    }

    /// Draws every tree, one line per node, in root order.
    pub fn debug_draw(&self, node_display: impl FnMut(&V) -> Option<String>) -> String {
        self.nodes
            .debug_draw(self.roots.iter().map(|r| r.root_id), node_display)
    }
}

impl<R, V> Navigator for Forest<R, V> {
    type Node = TreeNodeId;

    fn parent_of(&self, node: &TreeNodeId) -> Option<TreeNodeId> {
        self.nodes.parent_of(node)
    }

    fn child_index_of(&self, node: &TreeNodeId) -> Option<usize> {
        self.nodes.child_index_of(node)
    }

    fn child_count_of(&self, node: &TreeNodeId) -> usize {
        self.nodes.child_count_of(node)
    }

    fn child_at(&self, node: &TreeNodeId, index: usize) -> Option<TreeNodeId> {
        self.nodes.child_at(node, index)
    }
}
