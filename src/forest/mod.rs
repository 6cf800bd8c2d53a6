//! Ordered forests keyed by caller assigned node ids.
//!
//! Every node has an ordered collection of child nodes, and the root nodes
//! are ordered as well. The order is the display order of a tree view.
//!
//! [`TreeData`] is the interface shared by the implementations in this
//! module. Apart from the queries each implementation answers directly, it
//! provides ancestor queries, traversal and an invariant check on top.
use std::collections::HashSet;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use tracing::debug;

use crate::error::{ForestError, Result};
use crate::node::TreeNode;
use crate::INVALID_ID;

mod arena;
mod snapshot;

pub use arena::OrderedForest;
pub use snapshot::SnapshotForest;

/// Queries and mutations of an ordered forest.
///
/// Ids that are not in the forest are answered with `None`, `false` or an
/// empty slice. Only violations of the forest's structure, such as adding an
/// id twice or moving a node below itself, are reported as errors, and a
/// rejected mutation leaves the forest unchanged.
pub trait TreeData<T> {
    /// Returns the ids of the root nodes in order.
    fn root_ids(&self) -> &[i32];

    /// Returns the ids of a node's children in order.
    ///
    /// Unknown ids have no children.
    fn child_ids(&self, id: i32) -> &[i32];

    /// Returns a node's parent or `None` if it is a root or not in the forest.
    fn parent(&self, id: i32) -> Option<i32>;

    /// Borrows the data associated with a node.
    fn data(&self, id: i32) -> Option<&T>;

    /// Returns a copy of a node together with its subtree.
    fn get_data_for_id(&self, id: i32) -> Option<TreeNode<T>>
    where
        T: Clone;

    /// Returns the number of nodes in the forest.
    fn len(&self) -> usize;

    /// Returns whether the forest contains a node with the given id.
    fn contains(&self, id: i32) -> bool;

    /// Adds a node and its subtree to the forest.
    ///
    /// The node becomes the child of `parent_id` at position `child_index`,
    /// or a root when `parent_id` is [`INVALID_ID`]. A negative index, or one
    /// past the end of the list, appends.
    ///
    /// # Errors
    ///
    ///  - When any id in the subtree is [`INVALID_ID`].
    ///  - When any id in the subtree is already present, or occurs twice.
    ///  - When the parent is not in the forest.
    fn add_item(&mut self, item: TreeNode<T>, parent_id: i32, child_index: i32) -> Result<()>;

    /// Removes a node together with its subtree.
    ///
    /// Returns `false` and leaves the forest unchanged when the id is unknown.
    fn try_remove(&mut self, id: i32) -> bool;

    /// Moves a node with its subtree to a new position.
    ///
    /// `child_index` is the position the node should end up at. When the node
    /// is moved within its current list to a later position, the index is
    /// corrected for the node's own removal. Returns `Ok(false)` when the id
    /// is unknown.
    ///
    /// # Errors
    ///
    ///  - When the new parent is not in the forest.
    ///  - When the new parent is the node itself or one of its descendants.
    fn move_item(&mut self, id: i32, new_parent_id: i32, child_index: i32) -> Result<bool>;

    /// Replaces the data of a node, returning the previous data.
    ///
    /// Returns `None` and drops `data` when the id is unknown.
    fn set_data(&mut self, id: i32, data: T) -> Option<T>;

    /// Removes all nodes.
    fn clear(&mut self);

    /// Returns whether the forest has no nodes.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a node's parent, or [`INVALID_ID`] if it is a root or unknown.
    #[inline]
    fn parent_id(&self, id: i32) -> i32 {
        self.parent(id).unwrap_or(INVALID_ID)
    }

    /// Returns the position of a node within its parent's children, or within
    /// the roots.
    fn child_index(&self, id: i32) -> Option<usize> {
        let siblings = match self.parent(id) {
            Some(parent) => self.child_ids(parent),
            None if self.contains(id) => self.root_ids(),
            None => return None,
        };
        siblings.iter().position(|&sibling| sibling == id)
    }

    /// Returns whether `ancestor` is a strict ancestor of `child`.
    ///
    /// The walk up the parent chain takes at most [`TreeData::len`] steps.
    fn has_ancestor(&self, child: i32, ancestor: i32) -> bool {
        if child == INVALID_ID || ancestor == INVALID_ID {
            return false;
        }

        let mut current = child;
        for _ in 0..self.len() {
            match self.parent(current) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = parent,
                None => return false,
            }
        }

        false
    }

    /// Returns the number of ancestors of a node; roots have depth zero.
    fn depth(&self, id: i32) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }

        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
            if depth > self.len() {
                return None;
            }
        }

        Some(depth)
    }

    /// Returns copies of the root nodes with their subtrees, in order.
    ///
    /// Building a forest from the result reproduces this forest.
    fn root_items(&self) -> Vec<TreeNode<T>>
    where
        T: Clone,
    {
        self.root_ids()
            .iter()
            .filter_map(|&id| self.get_data_for_id(id))
            .collect()
    }

    /// Iterates over all node ids in display order: each node is followed by
    /// its descendants.
    fn depth_first(&self) -> DepthFirst<'_, T, Self> {
        DepthFirst::new(self)
    }

    /// Checks that the forest's indices are consistent with each other.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::Inconsistent`] describing the first violation.
    fn validate(&self) -> Result<()> {
        validate_structure::<T, Self>(self)
    }
}

/// Iterator created by [`TreeData::depth_first`].
pub struct DepthFirst<'a, T, F: ?Sized> {
    forest: &'a F,
    stack: Vec<std::slice::Iter<'a, i32>>,
    phantom: PhantomData<fn() -> T>,
}

impl<'a, T, F: TreeData<T> + ?Sized> DepthFirst<'a, T, F> {
    fn new(forest: &'a F) -> Self {
        Self {
            forest,
            stack: vec![forest.root_ids().iter()],
            phantom: PhantomData,
        }
    }
}

impl<'a, T, F: TreeData<T> + ?Sized> Iterator for DepthFirst<'a, T, F> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(&id) => {
                    let children = self.forest.child_ids(id);
                    if !children.is_empty() {
                        self.stack.push(children.iter());
                    }
                    return Some(id);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<'a, T, F: TreeData<T> + ?Sized> FusedIterator for DepthFirst<'a, T, F> {}

/// Resolves a caller supplied child index against a list of length `len`.
///
/// Negative and out of range indices append.
pub(crate) fn insertion_index(child_index: i32, len: usize) -> usize {
    match usize::try_from(child_index) {
        Ok(index) if index < len => index,
        _ => len,
    }
}

/// Corrects the target index of a move within the same list.
///
/// The node is removed before it is reinserted, so every position after the
/// source shifts down by one.
pub(crate) fn corrected_move_index(source: usize, child_index: i32) -> i32 {
    match usize::try_from(child_index) {
        Ok(index) if source < index => child_index - 1,
        _ => child_index,
    }
}

/// Ensures that the subtree rooted at `item` can be added to a forest.
pub(crate) fn check_new_subtree<T>(
    item: &TreeNode<T>,
    contains: impl Fn(i32) -> bool,
) -> Result<()> {
    let mut seen = HashSet::new();

    for id in item.subtree_ids() {
        if id == INVALID_ID {
            debug!("rejecting node with the reserved invalid id");
            return Err(ForestError::InvalidId);
        } else if contains(id) || !seen.insert(id) {
            debug!(id, "rejecting duplicate node id");
            return Err(ForestError::DuplicateId(id));
        }
    }

    Ok(())
}

/// Ensures that moving `id` below `new_parent_id` keeps the forest acyclic.
pub(crate) fn check_move_target<T, F: TreeData<T> + ?Sized>(
    forest: &F,
    id: i32,
    new_parent_id: i32,
) -> Result<()> {
    if new_parent_id == INVALID_ID {
        return Ok(());
    }

    if !forest.contains(new_parent_id) {
        debug!(id, new_parent_id, "rejecting move below an unknown parent");
        return Err(ForestError::UnknownParent(new_parent_id));
    }

    if new_parent_id == id || forest.has_ancestor(new_parent_id, id) {
        debug!(id, new_parent_id, "rejecting move that would introduce a cycle");
        return Err(ForestError::Cycle {
            node: id,
            parent: new_parent_id,
        });
    }

    Ok(())
}

/// Walks the forest from its roots and checks the parent and child indices
/// against each other.
pub(crate) fn validate_structure<T, F: TreeData<T> + ?Sized>(forest: &F) -> Result<()> {
    let mut seen = HashSet::new();
    let mut stack: Vec<(i32, Option<i32>)> = forest
        .root_ids()
        .iter()
        .rev()
        .map(|&id| (id, None))
        .collect();

    while let Some((id, expected_parent)) = stack.pop() {
        if !forest.contains(id) {
            return Err(ForestError::Inconsistent(format!(
                "node {id} is referenced but not stored"
            )));
        }

        if !seen.insert(id) {
            return Err(ForestError::Inconsistent(format!(
                "node {id} is reachable more than once"
            )));
        }

        let parent = forest.parent(id);
        if parent != expected_parent {
            return Err(ForestError::Inconsistent(format!(
                "node {id} has parent {parent:?} but is listed under {expected_parent:?}"
            )));
        }

        stack.extend(forest.child_ids(id).iter().rev().map(|&child| (child, Some(id))));
    }

    if seen.len() != forest.len() {
        return Err(ForestError::Inconsistent(format!(
            "{} nodes are stored but only {} are reachable",
            forest.len(),
            seen.len()
        )));
    }

    Ok(())
}
