use bitvec::vec::BitVec;
use itertools::Itertools;

use crate::{
    navigate::{Navigate, Navigator},
    traverse::PathEntry,
};

use super::{ForestError, ParentId, RootId, TreeNodeId};

/// A node in the ChildVecStore: data, a parent pointer and an ordered vector of children.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CVNode<V> {
    pub parent: ParentId,
    pub data: V,
    pub children: Vec<TreeNodeId>,
}

impl<V> CVNode<V> {
    pub fn root(data: V, root_id: RootId) -> Self {
        CVNode {
            parent: ParentId::Root(root_id),
            data,
            children: Vec::new(),
        }
    }

    pub fn child(data: V, parent: TreeNodeId) -> Self {
        CVNode {
            parent: ParentId::Node(parent),
            data,
            children: Vec::new(),
        }
    }

    pub fn map<F, U>(self, mut transform: F) -> CVNode<U>
    where
        F: FnMut(V) -> U,
    {
        CVNode {
            parent: self.parent,
            data: transform(self.data),
            children: self.children,
        }
    }

    pub fn map_ref<F, U>(&self, mut transform: F) -> CVNode<U>
    where
        F: FnMut(&V) -> U,
    {
        CVNode {
            parent: self.parent,
            data: transform(&self.data),
            children: self.children.clone(),
        }
    }
}

/// Node storage where every node owns the ordered list of its children.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChildVecStore<V> {
    pub nodes: Vec<CVNode<V>>,
}

impl<V> Default for ChildVecStore<V> {
    fn default() -> Self {
        ChildVecStore { nodes: Vec::new() }
    }
}

impl<V> std::ops::Index<&TreeNodeId> for ChildVecStore<V> {
    type Output = ParentId;
    fn index(&self, index: &TreeNodeId) -> &Self::Output {
        &self.nodes[index.0].parent
    }
}

impl<V> std::ops::Index<TreeNodeId> for ChildVecStore<V> {
    type Output = V;
    fn index(&self, index: TreeNodeId) -> &Self::Output {
        &self.nodes[index.0].data
    }
}

impl<V> std::ops::IndexMut<TreeNodeId> for ChildVecStore<V> {
    fn index_mut(&mut self, index: TreeNodeId) -> &mut Self::Output {
        &mut self.nodes[index.0].data
    }
}

impl<V> FromIterator<CVNode<V>> for ChildVecStore<V> {
    fn from_iter<I: IntoIterator<Item = CVNode<V>>>(iter: I) -> Self {
        ChildVecStore {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl<V> ChildVecStore<V> {
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, node_id: TreeNodeId) -> Result<&V, ForestError> {
        self.nodes
            .get(node_id.0)
            .map(|n| &n.data)
            .ok_or(ForestError::InvalidNodeId(node_id))
    }

    pub fn add_root(&mut self, data: V, root_id: RootId) -> TreeNodeId {
        let node_id = TreeNodeId(self.nodes.len());
        self.nodes.push(CVNode::root(data, root_id));
        node_id
    }

    pub fn add_child(&mut self, data: V, parent: TreeNodeId) -> TreeNodeId {
        let node_id = TreeNodeId(self.nodes.len());
        self.nodes.push(CVNode::child(data, parent));
        // Add this child to its parent's list.
        self.nodes[parent.0].children.push(node_id);
        node_id
    }

    pub fn iter_node_id(&self) -> impl Iterator<Item = TreeNodeId> {
        (0..self.nodes.len()).map(TreeNodeId)
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (TreeNodeId, &V)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (TreeNodeId(i), &node.data))
    }

    pub fn iter_children(&self, node_id: TreeNodeId) -> impl Iterator<Item = TreeNodeId> + '_ {
        self.nodes[node_id.0].children.iter().copied()
    }

    /// Finds the `RootId` by traversing upwards.
    pub fn root(&self, node_id: TreeNodeId) -> RootId {
        let mut current = node_id;
        loop {
            match self[&current] {
                ParentId::Root(root_id) => return root_id,
                ParentId::Node(parent_node_id) => current = parent_node_id,
            }
        }
    }

    pub fn map<F, U>(self, mut transform: F) -> ChildVecStore<U>
    where
        F: FnMut(V) -> U,
    {
        self.nodes
            .into_iter()
            .map(|node| node.map(&mut transform))
            .collect()
    }

    pub fn map_ref<F, U>(&self, mut transform: F) -> ChildVecStore<U>
    where
        F: FnMut(&V) -> U,
    {
        self.nodes
            .iter()
            .map(|node| node.map_ref(&mut transform))
            .collect()
    }

    /// Checks that parent and child pointers describe a forest.
    ///
    /// Returns every root node together with the `RootId` it claims.
    pub fn validate(&self) -> Result<Vec<(RootId, TreeNodeId)>, ForestError> {
        let n = self.n_nodes();
        let mut roots = vec![];
        let mut claimed: BitVec = BitVec::repeat(false, n);

        for current in self.iter_node_id() {
            if ParentId::Node(current) == self[&current] {
                return Err(ForestError::CyclicParent(current));
            }

            let mut visited: BitVec = BitVec::repeat(false, n);
            let mut up = current;
            loop {
                if visited[up.0] {
                    return Err(ForestError::CyclicParent(current));
                }
                visited.set(up.0, true);
                match self[&up] {
                    ParentId::Node(p) if p.0 >= n => return Err(ForestError::InvalidNodeId(p)),
                    ParentId::Node(p) => up = p,
                    ParentId::Root(r) => {
                        if up == current {
                            roots.push((r, current));
                        }
                        break;
                    }
                }
            }

            for &child in &self.nodes[current.0].children {
                if child.0 >= n {
                    return Err(ForestError::InvalidNodeId(child));
                }
                if claimed[child.0] || self[&child] != ParentId::Node(current) {
                    return Err(ForestError::WrongParent(child));
                }
                claimed.set(child.0, true);
            }
        }

        if let Some(orphan) = self
            .iter_node_id()
            .find(|n| self[n].node().is_some() && !claimed[n.0])
        {
            return Err(ForestError::WrongParent(orphan));
        }

        Ok(roots)
    }

    /// Draws the trees below `roots`, one line per node.
    ///
    /// Each line is the node id, followed by `:label` if `node_display` gives one.
    pub fn debug_draw(
        &self,
        roots: impl IntoIterator<Item = TreeNodeId>,
        mut node_display: impl FnMut(&V) -> Option<String>,
    ) -> String {
        let mut output = String::new();

        for root in roots {
            let mut walk = self.preorder(root);
            while let Ok(node_id) = walk.take_next() {
                let path = walk.path();
                let mut line = String::new();

                // path[0] is the root, every other entry is drawn with a connector
                for (depth, entry) in path.iter().enumerate().skip(1) {
                    let last = self.is_last_child(path[depth - 1].node(), entry);
                    let drawn = if depth + 1 == path.len() {
                        if last {
                            "└── "
                        } else {
                            "├── "
                        }
                    } else if last {
                        "    "
                    } else {
                        "│   "
                    };
                    line.push_str(drawn);
                }

                line.push_str(&node_id.to_string());
                if let Some(label) = node_display(&self[node_id]) {
                    line.push(':');
                    line.push_str(&label);
                }
                output.push_str(line.trim_end());
                output.push('\n');
            }
        }

        output
    }

    fn is_last_child(&self, parent: &TreeNodeId, entry: &PathEntry<TreeNodeId>) -> bool {
        entry
            .index()
            .is_some_and(|index| index + 1 == self.child_count_of(parent))
    }
}

impl<V> Navigator for ChildVecStore<V> {
    type Node = TreeNodeId;

    fn parent_of(&self, node: &TreeNodeId) -> Option<TreeNodeId> {
        self[node].node()
    }

    fn child_index_of(&self, node: &TreeNodeId) -> Option<usize> {
        let parent = self.parent_of(node)?;
        self.iter_children(parent)
            .find_position(|c| c == node)
            .map(|(pos, _)| pos)
    }

    fn child_count_of(&self, node: &TreeNodeId) -> usize {
        self.nodes[node.0].children.len()
    }

    fn child_at(&self, node: &TreeNodeId, index: usize) -> Option<TreeNodeId> {
        self.nodes[node.0].children.get(index).copied()
    }
}
