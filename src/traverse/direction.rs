//! Single-step transitions of the traversal state machine.
//!
//! Both directions share construction and the pull protocol in
//! [`Traversal`](super::Traversal); they differ only in how the path stack moves
//! from one node to the next.

use crate::navigate::Navigator;

use super::path::{PathEntry, PathStack};

/// A traversal direction.
pub trait Direction {
    /// Adjusts a freshly rooted path before the first element is produced.
    fn seat<Nav: Navigator>(_path: &mut PathStack<Nav::Node>, _navigator: &Nav) {}

    /// Moves the top of `path` to the next node, or empties `path` if there is none.
    fn advance<Nav: Navigator>(path: &mut PathStack<Nav::Node>, navigator: &Nav);
}

/// Pre-order: parent before children, children left to right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Forward;

/// Reverse pre-order: the exact reverse of [`Forward`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inverse;

impl Direction for Forward {
    fn advance<Nav: Navigator>(path: &mut PathStack<Nav::Node>, navigator: &Nav) {
        let Some(top) = path.top_node() else {
            return;
        };

        // leftmost child first
        if let Some(child) = navigator.child_at(top, 0) {
            path.push(PathEntry::child(child, 0));
            return;
        }

        // otherwise climb until some ancestor has a next sibling
        while let Some(popped) = path.pop() {
            if path.len() < path.floor() {
                path.clear();
                return;
            }

            let (Some(parent), Some(index)) = (path.top_node(), popped.index()) else {
                path.clear();
                return;
            };

            let next = index + 1;
            if let Some(sibling) = navigator.child_at(parent, next) {
                path.push(PathEntry::child(sibling, next));
                return;
            }
        }
    }
}

impl Direction for Inverse {
    fn seat<Nav: Navigator>(path: &mut PathStack<Nav::Node>, navigator: &Nav) {
        path.descend_last(navigator);
    }

    fn advance<Nav: Navigator>(path: &mut PathStack<Nav::Node>, navigator: &Nav) {
        let Some(current) = path.pop() else {
            return;
        };

        let (Some(parent), Some(index)) = (path.top_node(), current.index()) else {
            path.clear();
            return;
        };

        // Without a left sibling the parent, now on top, is the predecessor.
        let Some(left) = index.checked_sub(1) else {
            return;
        };

        if let Some(sibling) = navigator.child_at(parent, left) {
            path.push(PathEntry::child(sibling, left));
            path.descend_last(navigator);
        }
    }
}
