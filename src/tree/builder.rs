//! Folding flat keyed elements into a forest.
//!
//! Every element carries a key made of segments, `a/b/c` being the segments
//! `a`, `b`, `c`. Elements whose keys share a prefix share the nodes of that
//! prefix, so
//! ```text
//! a/b   = 1
//! a/c/d = 2
//! e     = 3
//! ```
//! becomes two trees, `a{b, c{d}}` and `e`. Siblings are kept in the order their
//! segment first appeared. Nodes that only exist as a prefix (here `a` and `c`)
//! carry no value.

use std::hash::Hash;

use ahash::AHashMap;
use tracing::{debug, trace};

use crate::navigate::Navigator;

use super::{Forest, ForestError, TreeNodeId};

/// Node data of a prefix forest.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrefixNode<K, V> {
    pub segment: K,
    pub value: Option<V>,
}

/// Incrementally folds keyed elements into a [`PrefixForest`].
#[derive(Debug, Clone)]
pub struct PrefixForestBuilder<K, V> {
    forest: Forest<(), PrefixNode<K, V>>,
    lookup: AHashMap<(Option<TreeNodeId>, K), TreeNodeId>,
    position: usize,
}

impl<K, V> Default for PrefixForestBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> PrefixForestBuilder<K, V> {
    pub fn new() -> Self {
        PrefixForestBuilder {
            forest: Forest::new(),
            lookup: AHashMap::new(),
            position: 0,
        }
    }
}

impl<K: Clone + Eq + Hash, V> PrefixForestBuilder<K, V> {
    /// Adds one element, creating whatever prefix nodes are missing.
    ///
    /// Returns the node that now holds `value`.
    pub fn push<I>(&mut self, key: I, value: V) -> Result<TreeNodeId, ForestError>
    where
        I: IntoIterator<Item = K>,
    {
        let position = self.position;
        self.position += 1;

        let mut parent = None;
        let mut depth = 0;
        for segment in key {
            let node = match self.lookup.get(&(parent, segment.clone())).copied() {
                Some(node) => node,
                None => {
                    let data = PrefixNode {
                        segment: segment.clone(),
                        value: None,
                    };
                    let node = match parent {
                        Some(parent) => self.forest.add_child(parent, data),
                        None => self.forest.add_root(data, ()).0,
                    };
                    self.lookup.insert((parent, segment), node);
                    node
                }
            };
            parent = Some(node);
            depth += 1;
        }

        let node = parent.ok_or(ForestError::EmptyKey { position })?;
        let slot = &mut self.forest[node].value;
        if slot.is_some() {
            return Err(ForestError::DuplicateKey { position });
        }
        *slot = Some(value);

        trace!(position, depth, node = %node, "inserted keyed element");
        Ok(node)
    }

    pub fn build(self) -> PrefixForest<K, V> {
        debug!(
            elements = self.position,
            nodes = self.forest.n_nodes(),
            roots = self.forest.n_roots(),
            "built prefix forest"
        );
        PrefixForest {
            forest: self.forest,
            lookup: self.lookup,
        }
    }
}

/// Builds a prefix forest out of `(key, value)` pairs in one go.
pub fn build_prefix_forest<K, V, I, P>(elements: I) -> Result<PrefixForest<K, V>, ForestError>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = (P, V)>,
    P: IntoIterator<Item = K>,
{
    let mut builder = PrefixForestBuilder::new();
    for (key, value) in elements {
        builder.push(key, value)?;
    }
    Ok(builder.build())
}

/// A forest built from keyed elements, which still knows how to find them by key.
#[derive(Debug, Clone)]
pub struct PrefixForest<K, V> {
    forest: Forest<(), PrefixNode<K, V>>,
    lookup: AHashMap<(Option<TreeNodeId>, K), TreeNodeId>,
}

impl<K, V> PrefixForest<K, V> {
    pub fn forest(&self) -> &Forest<(), PrefixNode<K, V>> {
        &self.forest
    }

    pub fn into_forest(self) -> Forest<(), PrefixNode<K, V>> {
        self.forest
    }

    /// Transforms the stored values; a value mapped to `None` leaves its node valueless.
    pub fn map_values<U>(self, mut transform: impl FnMut(V) -> Option<U>) -> PrefixForest<K, U> {
        PrefixForest {
            forest: self.forest.map_nodes(|node| PrefixNode {
                segment: node.segment,
                value: node.value.and_then(&mut transform),
            }),
            lookup: self.lookup,
        }
    }

    /// The segments from the root of `node`'s tree down to `node`.
    pub fn key_of(&self, node: TreeNodeId) -> Vec<&K> {
        let mut key: Vec<&K> = self
            .forest
            .iter_ancestors(node)
            .map(|n| &self.forest[n].segment)
            .collect();
        key.reverse();
        key
    }
}

impl<K: Clone + Eq + Hash, V> PrefixForest<K, V> {
    /// The node reached by following `key` from the roots, prefix nodes included.
    pub fn find<I>(&self, key: I) -> Option<TreeNodeId>
    where
        I: IntoIterator<Item = K>,
    {
        key.into_iter()
            .try_fold(None, |parent, segment| {
                self.lookup.get(&(parent, segment)).map(|&node| Some(node))
            })
            .flatten()
    }

    /// The value stored under exactly `key`.
    pub fn get<I>(&self, key: I) -> Option<&V>
    where
        I: IntoIterator<Item = K>,
    {
        self.find(key)
            .and_then(|node| self.forest[node].value.as_ref())
    }
}

impl<K, V> Navigator for PrefixForest<K, V> {
    type Node = TreeNodeId;

    fn parent_of(&self, node: &TreeNodeId) -> Option<TreeNodeId> {
        self.forest.parent_of(node)
    }

    fn child_index_of(&self, node: &TreeNodeId) -> Option<usize> {
        self.forest.child_index_of(node)
    }

    fn child_count_of(&self, node: &TreeNodeId) -> usize {
        self.forest.child_count_of(node)
    }

    fn child_at(&self, node: &TreeNodeId, index: usize) -> Option<TreeNodeId> {
        self.forest.child_at(node, index)
    }
}

#[cfg(test)]
mod test {
    use similar_asserts::assert_eq;

    use crate::navigate::Navigate;

    use super::*;

    fn segments(key: &str) -> Vec<String> {
        key.split('/').map(str::to_owned).collect()
    }

    fn sample() -> PrefixForest<String, u32> {
        build_prefix_forest(
            [("a/b", 1), ("a/c/d", 2), ("e", 3), ("a/c", 4)]
                .into_iter()
                .map(|(k, v)| (segments(k), v)),
        )
        .unwrap()
    }

    #[test]
    fn shared_prefixes_share_nodes() {
        let prefix = sample();
        let forest = prefix.forest();

        assert_eq!(forest.n_roots(), 2);
        assert_eq!(forest.n_nodes(), 5);

        let a = prefix.find(segments("a")).unwrap();
        let children: Vec<_> = forest
            .iter_children(a)
            .map(|c| forest[c].segment.as_str())
            .collect();
        assert_eq!(children, vec!["b", "c"]);
        assert_eq!(forest[a].value, None);
    }

    #[test]
    fn values_land_on_full_keys() {
        let prefix = sample();
        assert_eq!(prefix.get(segments("a/b")), Some(&1));
        assert_eq!(prefix.get(segments("a/c/d")), Some(&2));
        assert_eq!(prefix.get(segments("a/c")), Some(&4));
        assert_eq!(prefix.get(segments("a")), None);
        assert_eq!(prefix.find(segments("a/x")), None);
    }

    #[test]
    fn key_of_walks_back_up() {
        let prefix = sample();
        let d = prefix.find(segments("a/c/d")).unwrap();
        let key: Vec<&str> = prefix.key_of(d).into_iter().map(String::as_str).collect();
        assert_eq!(key, vec!["a", "c", "d"]);
    }

    #[test]
    fn preorder_follows_first_appearance() {
        let prefix = sample();
        let a = prefix.find(segments("a")).unwrap();
        let order: Vec<_> = prefix
            .preorder(a)
            .map(|n| prefix.forest()[n].segment.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn map_values_keeps_lookup() {
        let prefix = sample().map_values(|v| (v % 2 == 0).then(|| v * 10));
        assert_eq!(prefix.get(segments("a/c/d")), Some(&20));
        assert_eq!(prefix.get(segments("a/b")), None);
        assert!(prefix.find(segments("a/b")).is_some());
    }

    #[test]
    fn empty_key_is_rejected() {
        let mut builder = PrefixForestBuilder::<String, u32>::new();
        builder.push(segments("x"), 0).unwrap();
        assert_eq!(
            builder.push(Vec::new(), 1),
            Err(ForestError::EmptyKey { position: 1 })
        );
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let result = build_prefix_forest(
            [("a/b", 1), ("a/b", 2)]
                .into_iter()
                .map(|(k, v)| (segments(k), v)),
        );
        assert_eq!(result.unwrap_err(), ForestError::DuplicateKey { position: 1 });
    }

    #[test]
    fn built_forest_validates() {
        assert_eq!(sample().forest().validate(), Ok(()));
    }
}
