//! Reference-counted mutable tree nodes.
//!
//! A [`SharedNode`] is a handle: cloning it shares the node, and `==` compares
//! handles by address, so two nodes with equal data are still different nodes.
//! Children are held strongly and the parent weakly, which keeps a tree alive
//! from its root and lets a detached subtree drop on its own.
//!
//! [`SharedNavigator`] lets the traversal engine walk such trees.

use std::{
    cell::{Ref, RefCell},
    fmt,
    marker::PhantomData,
    rc::{Rc, Weak},
};

use by_address::ByAddress;
use thiserror::Error;

use crate::navigate::Navigator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SharedNodeError {
    #[error("A node cannot become a descendant of itself")]
    WouldCycle,
    #[error("Child position {index} is out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
}

struct Inner<T> {
    data: T,
    parent: Weak<RefCell<Inner<T>>>,
    children: Vec<SharedNode<T>>,
}

/// A node of a mutable tree, compared by identity.
pub struct SharedNode<T>(ByAddress<Rc<RefCell<Inner<T>>>>);

impl<T> Clone for SharedNode<T> {
    fn clone(&self) -> Self {
        SharedNode(self.0.clone())
    }
}

impl<T> PartialEq for SharedNode<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for SharedNode<T> {}

impl<T> std::hash::Hash for SharedNode<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.0, state)
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.cell().borrow();
        f.debug_struct("SharedNode")
            .field("data", &inner.data)
            .field("children", &inner.children.len())
            .finish()
    }
}

impl<T> SharedNode<T> {
    pub fn new(data: T) -> Self {
        SharedNode(ByAddress(Rc::new(RefCell::new(Inner {
            data,
            parent: Weak::new(),
            children: Vec::new(),
        }))))
    }

    fn cell(&self) -> &RefCell<Inner<T>> {
        &self.0 .0
    }

    pub fn data(&self) -> Ref<'_, T> {
        Ref::map(self.cell().borrow(), |inner| &inner.data)
    }

    /// Replaces the data, returning the old one.
    pub fn set_data(&self, data: T) -> T {
        std::mem::replace(&mut self.cell().borrow_mut().data, data)
    }

    pub fn with_data<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell().borrow().data)
    }

    pub fn parent(&self) -> Option<SharedNode<T>> {
        self.cell()
            .borrow()
            .parent
            .upgrade()
            .map(|rc| SharedNode(ByAddress(rc)))
    }

    pub fn children(&self) -> Vec<SharedNode<T>> {
        self.cell().borrow().children.clone()
    }

    pub fn child(&self, index: usize) -> Option<SharedNode<T>> {
        self.cell().borrow().children.get(index).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.cell().borrow().children.len()
    }

    /// Position among the parent's children.
    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent()?;
        let position = parent.cell().borrow().children.iter().position(|c| c == self);
        position
    }

    /// Whether `self` is `other` or one of its ancestors.
    pub fn is_ancestor_of(&self, other: &SharedNode<T>) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node == *self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    pub fn append_child(&self, child: &SharedNode<T>) -> Result<(), SharedNodeError> {
        let len = self.child_count() - usize::from(child.parent().as_ref() == Some(self));
        self.insert_child(len, child)
    }

    /// Inserts `child` at `index`, detaching it from wherever it was first.
    pub fn insert_child(&self, index: usize, child: &SharedNode<T>) -> Result<(), SharedNodeError> {
        if child.is_ancestor_of(self) {
            return Err(SharedNodeError::WouldCycle);
        }

        let already_here = child.parent().as_ref() == Some(self);
        let len = self.child_count() - usize::from(already_here);
        if index > len {
            return Err(SharedNodeError::IndexOutOfRange { index, len });
        }

        child.detach();
        child.cell().borrow_mut().parent = Rc::downgrade(&self.0 .0);
        self.cell().borrow_mut().children.insert(index, child.clone());
        Ok(())
    }

    /// Removes `self` from its parent, returning the position it had.
    pub fn detach(&self) -> Option<usize> {
        let parent = self.parent()?;
        let index = self.index_in_parent();
        if let Some(index) = index {
            parent.cell().borrow_mut().children.remove(index);
        }
        self.cell().borrow_mut().parent = Weak::new();
        index
    }
}

/// Navigates trees of [`SharedNode`]s.
pub struct SharedNavigator<T>(PhantomData<fn() -> T>);

impl<T> SharedNavigator<T> {
    pub fn new() -> Self {
        SharedNavigator(PhantomData)
    }
}

impl<T> Default for SharedNavigator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SharedNavigator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SharedNavigator<T> {}

impl<T> Navigator for SharedNavigator<T> {
    type Node = SharedNode<T>;

    fn parent_of(&self, node: &SharedNode<T>) -> Option<SharedNode<T>> {
        node.parent()
    }

    fn child_index_of(&self, node: &SharedNode<T>) -> Option<usize> {
        node.index_in_parent()
    }

    fn child_count_of(&self, node: &SharedNode<T>) -> usize {
        node.child_count()
    }

    fn child_at(&self, node: &SharedNode<T>, index: usize) -> Option<SharedNode<T>> {
        node.child(index)
    }
}

#[cfg(test)]
mod test {
    use similar_asserts::assert_eq;

    use crate::{
        navigate::Navigate,
        traverse::{Inverse, Traversal, TraversalError},
    };

    use super::*;

    fn labels(nodes: impl Iterator<Item = SharedNode<&'static str>>) -> Vec<&'static str> {
        nodes.map(|n| n.with_data(|label| *label)).collect()
    }

    /// `r{a{b, c}, d}`
    fn sample() -> [SharedNode<&'static str>; 5] {
        let [r, a, b, c, d] = ["r", "a", "b", "c", "d"].map(SharedNode::new);
        r.append_child(&a).unwrap();
        a.append_child(&b).unwrap();
        a.append_child(&c).unwrap();
        r.append_child(&d).unwrap();
        [r, a, b, c, d]
    }

    #[test]
    fn identity_not_data() {
        let x = SharedNode::new(1);
        let y = SharedNode::new(1);
        assert!(x != y);
        assert!(x == x.clone());
    }

    #[test]
    fn structure_queries() {
        let [r, a, b, c, d] = sample();
        assert_eq!(r.child_count(), 2);
        assert_eq!(c.index_in_parent(), Some(1));
        assert_eq!(d.index_in_parent(), Some(1));
        assert_eq!(r.index_in_parent(), None);
        assert!(b.parent() == Some(a.clone()));
        assert!(r.is_ancestor_of(&c));
        assert!(!a.is_ancestor_of(&d));
    }

    #[test]
    fn traversals() {
        let [r, _, _, c, _] = sample();
        let nav = SharedNavigator::new();

        assert_eq!(labels(nav.preorder(r.clone())), vec!["r", "a", "b", "c", "d"]);
        assert_eq!(
            labels(nav.inverse_preorder(r.clone())),
            vec!["d", "c", "b", "a", "r"]
        );
        assert_eq!(
            labels(Traversal::<_, Inverse>::starting_at(nav, r, c).unwrap()),
            vec!["c", "b", "a", "r"]
        );
    }

    #[test]
    fn moving_a_subtree_changes_the_walk() {
        let [r, a, _, c, d] = sample();
        d.append_child(&c).unwrap();

        assert_eq!(a.child_count(), 1);
        assert!(c.parent() == Some(d.clone()));
        assert_eq!(
            labels(SharedNavigator::new().preorder(r)),
            vec!["r", "a", "b", "d", "c"]
        );
    }

    #[test]
    fn insert_and_detach() {
        let [r, a, b, _, d] = sample();
        let e = SharedNode::new("e");

        r.insert_child(1, &e).unwrap();
        assert_eq!(e.index_in_parent(), Some(1));
        assert_eq!(d.index_in_parent(), Some(2));

        assert_eq!(a.detach(), Some(0));
        assert!(a.parent().is_none());
        assert_eq!(labels(SharedNavigator::new().preorder(r.clone())), vec!["r", "e", "d"]);

        let err = SharedNavigator::new().preorder_from(r, b).err();
        assert_eq!(err, Some(TraversalError::InvalidStart));
    }

    #[test]
    fn reordering_within_the_same_parent() {
        let [r, a, _, _, d] = sample();
        r.insert_child(0, &d).unwrap();
        assert_eq!(r.child_count(), 2);
        assert_eq!(d.index_in_parent(), Some(0));
        assert_eq!(a.index_in_parent(), Some(1));

        r.append_child(&d).unwrap();
        assert_eq!(d.index_in_parent(), Some(1));
    }

    #[test]
    fn cycles_and_bad_positions_are_rejected() {
        let [r, a, b, _, _] = sample();
        assert_eq!(b.append_child(&r), Err(SharedNodeError::WouldCycle));
        assert_eq!(a.append_child(&a), Err(SharedNodeError::WouldCycle));
        assert_eq!(
            a.insert_child(5, &SharedNode::new("x")),
            Err(SharedNodeError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn data_can_be_replaced() {
        let node = SharedNode::new(String::from("old"));
        assert_eq!(node.set_data(String::from("new")), "old");
        assert_eq!(node.with_data(String::len), 3);
    }
}
