use std::collections::HashMap;

use tracing::{debug, trace};

use super::{check_move_target, check_new_subtree, corrected_move_index, insertion_index, TreeData};
use crate::error::{ForestError, Result};
use crate::node::TreeNode;
use crate::INVALID_ID;

/// A forest storing each node once, keyed by id.
///
/// Children are kept as ordered lists of ids, so changing a node never
/// touches its ancestors. [`TreeNode`] snapshots are assembled on demand by
/// [`TreeData::get_data_for_id`].
///
/// # Example
///
/// ```
/// # use idforest::{OrderedForest, TreeData, TreeNode, INVALID_ID};
/// let mut forest = OrderedForest::from_roots([
///     TreeNode::new(1, 'a').child(TreeNode::new(2, 'b')).child(TreeNode::new(3, 'c')),
/// ])
/// .unwrap();
///
/// assert!(forest.try_remove(1));
/// assert!(!forest.contains(3));
/// assert!(forest.root_ids().is_empty());
/// assert!(!forest.try_remove(1));
/// ```
#[derive(Debug, Clone)]
pub struct OrderedForest<T> {
    nodes: HashMap<i32, NodeData<T>>,
    roots: Vec<i32>,
}

#[derive(Debug, Clone)]
struct NodeData<T> {
    /// Associated node data.
    data: T,
    /// The parent of the node, if any.
    parent: Option<i32>,
    /// The ordered children of the node.
    children: Vec<i32>,
}

impl<T> OrderedForest<T> {
    /// Creates a new empty forest.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new empty forest with preallocated space for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
            roots: Vec::new(),
        }
    }

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
            check_new_subtree(&root, |id| forest.nodes.contains_key(&id))?;
            forest.roots.push(root.id);
            forest.index_subtree(root, None);
        }

        trace!(nodes = forest.nodes.len(), roots = forest.roots.len(), "built forest");
        Ok(forest)
    }

    /// Replaces the contents of the forest with new root nodes.
    ///
    /// The forest is left unchanged when the new roots are rejected.
    ///
    /// # Errors
    ///
    /// See [`OrderedForest::from_roots`].
    pub fn set_root_items(&mut self, roots: impl IntoIterator<Item = TreeNode<T>>) -> Result<()> {
        *self = Self::from_roots(roots)?;
        Ok(())
    }

    /// Mutably borrows the data associated with a node.
    #[inline]
    pub fn data_mut(&mut self, id: i32) -> Option<&mut T> {
        Some(&mut self.nodes.get_mut(&id)?.data)
    }

    /// Inserts the nodes of a subtree into the table, with `parent` as the
    /// parent of its root. Does not link the root into any child list.
    fn index_subtree(&mut self, item: TreeNode<T>, parent: Option<i32>) {
        let mut stack = vec![(item, parent)];

        while let Some((node, parent)) = stack.pop() {
            let TreeNode { id, data, children } = node;
            let child_ids = children.iter().map(|child| child.id).collect();

            self.nodes.insert(
                id,
                NodeData {
                    data,
                    parent,
                    children: child_ids,
                },
            );

            stack.extend(children.into_iter().map(|child| (child, Some(id))));
        }
    }

    /// Returns the list a node with the given parent lives in.
    fn siblings_mut(&mut self, parent: Option<i32>) -> Option<&mut Vec<i32>> {
        match parent {
            None => Some(&mut self.roots),
            Some(parent) => Some(&mut self.nodes.get_mut(&parent)?.children),
        }
    }

    /// Unlinks a node from its parent's children or the roots, returning its
    /// former position.
    fn unlink(&mut self, id: i32, parent: Option<i32>) -> Option<usize> {
        let siblings = self.siblings_mut(parent)?;
        let position = siblings.iter().position(|&sibling| sibling == id)?;
        siblings.remove(position);
        Some(position)
    }

    /// Links a node into its parent's children or the roots.
    fn link(&mut self, id: i32, parent: Option<i32>, child_index: i32) {
        if let Some(siblings) = self.siblings_mut(parent) {
            let index = insertion_index(child_index, siblings.len());
            siblings.insert(index, id);
        }
    }

    /// Assembles the snapshot of a subtree without recursing, so that the
    /// depth of the tree is not limited by the call stack.
    fn snapshot(&self, id: i32) -> Option<TreeNode<T>>
    where
        T: Clone,
    {
        let root = self.nodes.get(&id)?;

        // Each frame holds a node under construction and the cursor into its child ids.
        let mut stack = vec![(TreeNode::new(id, root.data.clone()), root.children.iter())];

        loop {
            let (_, cursor) = stack.last_mut()?;
            match cursor.next() {
                Some(&child) => {
                    if let Some(node) = self.nodes.get(&child) {
                        stack.push((TreeNode::new(child, node.data.clone()), node.children.iter()));
                    }
                }
                None => {
                    let (finished, _) = stack.pop()?;
                    match stack.last_mut() {
                        Some((parent, _)) => parent.children.push(finished),
                        None => return Some(finished),
                    }
                }
            }
        }
    }
}

impl<T> Default for OrderedForest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeData<T> for OrderedForest<T> {
    #[inline]
    fn root_ids(&self) -> &[i32] {
        &self.roots
    }

    #[inline]
    fn child_ids(&self, id: i32) -> &[i32] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    #[inline]
    fn parent(&self, id: i32) -> Option<i32> {
        self.nodes.get(&id)?.parent
    }

    #[inline]
    fn data(&self, id: i32) -> Option<&T> {
        Some(&self.nodes.get(&id)?.data)
    }

    fn get_data_for_id(&self, id: i32) -> Option<TreeNode<T>>
    where
        T: Clone,
    {
        self.snapshot(id)
    }

    #[inline]
    fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    fn contains(&self, id: i32) -> bool {
        self.nodes.contains_key(&id)
    }

    fn add_item(&mut self, item: TreeNode<T>, parent_id: i32, child_index: i32) -> Result<()> {
        let parent = if parent_id == INVALID_ID {
            None
        } else if self.nodes.contains_key(&parent_id) {
            Some(parent_id)
        } else {
            debug!(parent_id, "rejecting add below an unknown parent");
            return Err(ForestError::UnknownParent(parent_id));
        };

        check_new_subtree(&item, |id| self.nodes.contains_key(&id))?;

        let id = item.id;
        self.index_subtree(item, parent);
        self.link(id, parent, child_index);
        Ok(())
    }

    fn try_remove(&mut self, id: i32) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };

        let parent = node.parent;
        self.unlink(id, parent);

        let mut removed = 0usize;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(mut node) = self.nodes.remove(&next) {
                removed += 1;
                stack.append(&mut node.children);
            }
        }

        trace!(id, removed, "removed subtree");
        true
    }

    fn move_item(&mut self, id: i32, new_parent_id: i32, child_index: i32) -> Result<bool> {
        let Some(node) = self.nodes.get(&id) else {
            return Ok(false);
        };
        let old_parent = node.parent;

        check_move_target::<T, _>(&*self, id, new_parent_id)?;
        let new_parent = (new_parent_id != INVALID_ID).then_some(new_parent_id);

        let mut child_index = child_index;
        if let Some(source) = self.unlink(id, old_parent) {
            if old_parent == new_parent {
                child_index = corrected_move_index(source, child_index);
            }
        }

        self.link(id, new_parent, child_index);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = new_parent;
        }

        Ok(true)
    }

    fn set_data(&mut self, id: i32, data: T) -> Option<T> {
        let node = self.nodes.get_mut(&id)?;
        Some(std::mem::replace(&mut node.data, data))
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }
}
