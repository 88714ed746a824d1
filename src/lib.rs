//! # navtree
//!
//! navtree walks trees it does not own. A caller describes the shape of a
//! structure through a [`Navigator`](navigate::Navigator) (parent, child at an
//! index, number of children, own index among siblings) and gets back lazy
//! pre-order and reverse pre-order traversals, driven by an explicit stack so
//! that they can be paused after every node and never recurse.
//!
//! Ready-made navigators are provided for an arena [`Forest`](tree::Forest),
//! for reference-counted [`SharedNode`](shared::SharedNode)s, and for forests
//! built from flat keyed elements with [`tree::builder`].

pub mod navigate;
pub mod shared;
pub mod traverse;
pub mod tree;

pub use navigate::{Navigate, Navigator};
pub use traverse::{Forward, Inverse, InversePreorder, Preorder, Traversal, TraversalError};
