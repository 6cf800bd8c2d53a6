//! The value record stored in a forest.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node of a forest together with its subtree.
///
/// A `TreeNode` is a plain value: the forest copies it in when it is added
/// and hands out copies when it is read back. Mutating a `TreeNode` obtained
/// from a forest does not change the forest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeNode<T> {
    /// Caller assigned id, unique within a forest.
    pub id: i32,
    /// Associated node data.
    pub data: T,
    /// Ordered children of the node.
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Creates a node without children.
    pub fn new(id: i32, data: T) -> Self {
        Self {
            id,
            data,
            children: Vec::new(),
        }
    }

    /// Creates a node with the given children.
    pub fn with_children(id: i32, data: T, children: impl IntoIterator<Item = Self>) -> Self {
        Self {
            id,
            data,
            children: children.into_iter().collect(),
        }
    }

    /// Appends a child, builder style.
    ///
    /// # Example
    ///
    /// ```
    /// # use idforest::TreeNode;
    /// let node = TreeNode::new(1, ()).child(TreeNode::new(2, ())).child(TreeNode::new(3, ()));
    /// assert!(node.children.iter().map(|c| c.id).eq([2, 3]));
    /// ```
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Returns whether the node has any children.
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Iterates over the ids of the node and all its descendants in pre-order.
    pub fn subtree_ids(&self) -> impl Iterator<Item = i32> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node.id)
        })
    }

    /// Returns the number of nodes in the subtree, including the node itself.
    pub fn subtree_len(&self) -> usize {
        self.subtree_ids().count()
    }
}
