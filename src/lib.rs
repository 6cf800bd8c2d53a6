//! Ordered forests of caller-identified records.
//!
//! A forest holds the data behind a hierarchical list view: a sequence of
//! root [`TreeNode`]s, each owning an ordered list of children. Nodes are
//! identified by `i32` ids chosen by the caller, with [`INVALID_ID`] reserved
//! to mean "no parent".
//!
//! Two implementations of the [`TreeData`] trait are provided:
//!
//!  - [`OrderedForest`] stores every node once in a flat table and keeps
//!    children as lists of ids. This is the one to use by default.
//!  - [`SnapshotForest`] keeps a full value snapshot of every node's subtree
//!    and rewrites the ancestors' snapshots after each mutation. Lookups hand
//!    out stored records without rebuilding them.
//!
//! # Example
//!
//! ```
//! use idforest::{OrderedForest, TreeData, TreeNode, INVALID_ID};
//!
//! let mut forest = OrderedForest::from_roots([TreeNode::new(1, "animals")
//!     .child(TreeNode::new(2, "cat"))
//!     .child(TreeNode::new(3, "dog"))])
//! .unwrap();
//!
//! forest.add_item(TreeNode::new(4, "owl"), 1, 1).unwrap();
//! assert_eq!(forest.child_ids(1), &[2, 4, 3]);
//!
//! forest.move_item(3, INVALID_ID, 0).unwrap();
//! assert_eq!(forest.root_ids(), &[3, 1]);
//! assert_eq!(forest.parent_id(3), INVALID_ID);
//! ```
pub mod error;
pub mod forest;
pub mod node;

pub use error::{ForestError, Result};
pub use forest::{DepthFirst, OrderedForest, SnapshotForest, TreeData};
pub use node::TreeNode;

/// Reserved id meaning "no node". Used as the parent id of root nodes.
pub const INVALID_ID: i32 = -1;
