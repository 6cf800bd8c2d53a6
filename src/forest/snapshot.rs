use std::collections::HashMap;

use tracing::{debug, trace};

use super::{
    check_move_target, check_new_subtree, corrected_move_index, insertion_index, validate_structure,
    TreeData,
};
use crate::error::{ForestError, Result};
use crate::node::TreeNode;
use crate::INVALID_ID;

/// A forest storing a value snapshot of every node's subtree.
///
/// Each stored [`TreeNode`] embeds copies of its children, so reading a
/// subtree borrows a ready record via [`SnapshotForest::node`]. In exchange
/// every mutation rewrites the stored records of all ancestors of the changed
/// node, up to its root.
///
/// Parent and child ids are additionally kept in separate indices so that
/// structural queries do not need to look into the records.
///
/// # Example
///
/// ```
/// # use idforest::{SnapshotForest, TreeData, TreeNode};
/// let mut forest = SnapshotForest::from_roots([
///     TreeNode::new(1, "a").child(TreeNode::new(2, "b").child(TreeNode::new(3, "c"))),
/// ])
/// .unwrap();
///
/// forest.add_item(TreeNode::new(4, "d"), 3, -1).unwrap();
///
/// // The root's snapshot sees the grandchild's new child.
/// let root = forest.node(1).unwrap();
/// assert_eq!(root.children[0].children[0].children[0].id, 4);
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotForest<T> {
    root_ids: Vec<i32>,
    nodes_by_id: HashMap<i32, TreeNode<T>>,
    parent_of: HashMap<i32, i32>,
    child_ids_of: HashMap<i32, Vec<i32>>,
}

impl<T> SnapshotForest<T> {
    /// Creates a new empty forest.
    pub fn new() -> Self {
        Self {
            root_ids: Vec::new(),
            nodes_by_id: HashMap::new(),
            parent_of: HashMap::new(),
            child_ids_of: HashMap::new(),
        }
    }

    /// Borrows the stored snapshot of a node.
    #[inline]
    pub fn node(&self, id: i32) -> Option<&TreeNode<T>> {
        self.nodes_by_id.get(&id)
    }

    /// Checks that every stored record embeds the current data of each of its
    /// descendants.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::Inconsistent`] naming the first stale record.
    pub fn validate_payloads(&self) -> Result<()>
    where
        T: PartialEq,
    {
        for (&id, record) in &self.nodes_by_id {
            let mut stack: Vec<&TreeNode<T>> = record.children.iter().collect();
            while let Some(node) = stack.pop() {
                let stored = self.nodes_by_id.get(&node.id).map(|stored| &stored.data);
                if stored != Some(&node.data) {
                    return Err(ForestError::Inconsistent(format!(
                        "record of node {id} embeds stale data of node {}",
                        node.id
                    )));
                }
                stack.extend(&node.children);
            }
        }

        Ok(())
    }
}

impl<T> Default for SnapshotForest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SnapshotForest<T> {
    /// Builds a forest from an ordered sequence of root nodes and their
    /// subtrees.
    ///
    /// # Errors
    ///
    ///  - When any id is [`INVALID_ID`].
    ///  - When an id occurs more than once.
    pub fn from_roots(roots: impl IntoIterator<Item = TreeNode<T>>) -> Result<Self> {
        let mut forest = Self::new();

        for root in roots {
            check_new_subtree(&root, |id| forest.nodes_by_id.contains_key(&id))?;
            forest.root_ids.push(root.id);
            forest.index_subtree(root, None);
        }

        trace!(
            nodes = forest.nodes_by_id.len(),
            roots = forest.root_ids.len(),
            "built snapshot forest"
        );
        Ok(forest)
    }

    /// Replaces the contents of the forest with new root nodes.
    ///
    /// The forest is left unchanged when the new roots are rejected.
    ///
    /// # Errors
    ///
    /// See [`SnapshotForest::from_roots`].
    pub fn set_root_items(&mut self, roots: impl IntoIterator<Item = TreeNode<T>>) -> Result<()> {
        *self = Self::from_roots(roots)?;
        Ok(())
    }

    /// Records a subtree in all indices, with `parent` as the parent of its
    /// root. Does not link the root into its parent's records.
    fn index_subtree(&mut self, item: TreeNode<T>, parent: Option<i32>) {
        let mut stack = vec![(item, parent)];

        while let Some((node, parent)) = stack.pop() {
            let id = node.id;

            if let Some(parent) = parent {
                self.parent_of.insert(id, parent);
            }
            self.child_ids_of
                .insert(id, node.children.iter().map(|child| child.id).collect());
            stack.extend(node.children.iter().cloned().map(|child| (child, Some(id))));
            self.nodes_by_id.insert(id, node);
        }
    }

    /// Rewrites the stored records of all strict ancestors of `id` so that
    /// they embed the current record of `id`.
    fn propagate(&mut self, id: i32) {
        let mut current = id;

        // Bounded so that a corrupted parent index can not loop forever.
        for _ in 0..self.nodes_by_id.len() {
            let Some(&parent) = self.parent_of.get(&current) else {
                return;
            };
            let Some(updated) = self.nodes_by_id.get(&current).cloned() else {
                return;
            };
            let Some(parent_node) = self.nodes_by_id.get_mut(&parent) else {
                return;
            };

            if let Some(slot) = parent_node.children.iter_mut().find(|child| child.id == current) {
                *slot = updated;
            }

            current = parent;
        }
    }

    /// Unlinks a node from its parent or the roots, returning its former
    /// position.
    fn unlink(&mut self, id: i32) -> Option<usize> {
        let Some(parent) = self.parent_of.remove(&id) else {
            let position = self.root_ids.iter().position(|&root| root == id)?;
            self.root_ids.remove(position);
            return Some(position);
        };

        let siblings = self.child_ids_of.get_mut(&parent)?;
        let position = siblings.iter().position(|&sibling| sibling == id)?;
        siblings.remove(position);

        if let Some(parent_node) = self.nodes_by_id.get_mut(&parent) {
            parent_node.children.retain(|child| child.id != id);
        }
        self.propagate(parent);

        Some(position)
    }

    /// Links a node whose record is already stored into a parent or the
    /// roots.
    fn link(&mut self, record: TreeNode<T>, parent: Option<i32>, child_index: i32) {
        let id = record.id;

        let Some(parent) = parent else {
            let index = insertion_index(child_index, self.root_ids.len());
            self.root_ids.insert(index, id);
            return;
        };

        let Some(siblings) = self.child_ids_of.get_mut(&parent) else {
            return;
        };
        let index = insertion_index(child_index, siblings.len());
        siblings.insert(index, id);
        self.parent_of.insert(id, parent);

        if let Some(parent_node) = self.nodes_by_id.get_mut(&parent) {
            parent_node.children.insert(index, record);
        }
        self.propagate(parent);
    }

    /// Checks that every stored record embeds the same child ids as the
    /// child index, at every level of the record.
    fn validate_records(&self) -> Result<()> {
        for (&id, record) in &self.nodes_by_id {
            if record.id != id {
                return Err(ForestError::Inconsistent(format!(
                    "node {id} is stored with id {}",
                    record.id
                )));
            }

            let mut stack = vec![record];
            while let Some(node) = stack.pop() {
                let indexed = self.child_ids(node.id);
                if !node.children.iter().map(|child| child.id).eq(indexed.iter().copied()) {
                    return Err(ForestError::Inconsistent(format!(
                        "record of node {id} embeds stale children of node {}",
                        node.id
                    )));
                }
                stack.extend(&node.children);
            }
        }

        Ok(())
    }
}

impl<T: Clone> TreeData<T> for SnapshotForest<T> {
    #[inline]
    fn root_ids(&self) -> &[i32] {
        &self.root_ids
    }

    #[inline]
    fn child_ids(&self, id: i32) -> &[i32] {
        self.child_ids_of
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[inline]
    fn parent(&self, id: i32) -> Option<i32> {
        self.parent_of.get(&id).copied()
    }

    #[inline]
    fn data(&self, id: i32) -> Option<&T> {
        Some(&self.nodes_by_id.get(&id)?.data)
    }

    fn get_data_for_id(&self, id: i32) -> Option<TreeNode<T>>
    where
        T: Clone,
    {
        self.nodes_by_id.get(&id).cloned()
    }

    #[inline]
    fn len(&self) -> usize {
        self.nodes_by_id.len()
    }

    #[inline]
    fn contains(&self, id: i32) -> bool {
        self.nodes_by_id.contains_key(&id)
    }

    fn add_item(&mut self, item: TreeNode<T>, parent_id: i32, child_index: i32) -> Result<()> {
        let parent = if parent_id == INVALID_ID {
            None
        } else if self.nodes_by_id.contains_key(&parent_id) {
            Some(parent_id)
        } else {
            debug!(parent_id, "rejecting add below an unknown parent");
            return Err(ForestError::UnknownParent(parent_id));
        };

        check_new_subtree(&item, |id| self.nodes_by_id.contains_key(&id))?;

        self.index_subtree(item.clone(), parent);
        self.link(item, parent, child_index);
        Ok(())
    }

    fn try_remove(&mut self, id: i32) -> bool {
        if !self.nodes_by_id.contains_key(&id) {
            return false;
        }

        self.unlink(id);

        let mut removed = 0usize;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            self.nodes_by_id.remove(&next);
            self.parent_of.remove(&next);
            if let Some(children) = self.child_ids_of.remove(&next) {
                stack.extend(children);
            }
            removed += 1;
        }

        trace!(id, removed, "removed subtree");
        true
    }

    fn move_item(&mut self, id: i32, new_parent_id: i32, child_index: i32) -> Result<bool> {
        let Some(record) = self.nodes_by_id.get(&id).cloned() else {
            return Ok(false);
        };
        let old_parent = self.parent(id);

        check_move_target::<T, _>(&*self, id, new_parent_id)?;
        let new_parent = (new_parent_id != INVALID_ID).then_some(new_parent_id);

        let mut child_index = child_index;
        if let Some(source) = self.unlink(id) {
            if old_parent == new_parent {
                child_index = corrected_move_index(source, child_index);
            }
        }

        self.link(record, new_parent, child_index);
        Ok(true)
    }

    fn set_data(&mut self, id: i32, data: T) -> Option<T> {
        let node = self.nodes_by_id.get_mut(&id)?;
        let previous = std::mem::replace(&mut node.data, data);
        self.propagate(id);
        Some(previous)
    }

    fn clear(&mut self) {
        self.root_ids.clear();
        self.nodes_by_id.clear();
        self.parent_of.clear();
        self.child_ids_of.clear();
    }

    fn validate(&self) -> Result<()> {
        validate_structure::<T, Self>(self)?;
        self.validate_records()
    }
}
