//! Errors returned by forest mutations.
use thiserror::Error;

/// Result type returned by fallible forest operations.
pub type Result<T, E = ForestError> = std::result::Result<T, E>;

/// Error returned by [`TreeData::add_item`], [`TreeData::move_item`] and the
/// constructors.
///
/// Looking up or removing an id that is not in the forest is never an error.
///
/// [`TreeData::add_item`]: crate::TreeData::add_item
/// [`TreeData::move_item`]: crate::TreeData::move_item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForestError {
    #[error("the reserved invalid id can not be used as a node id")]
    InvalidId,
    #[error("node id {0} is already present")]
    DuplicateId(i32),
    #[error("unknown parent node {0}")]
    UnknownParent(i32),
    #[error("moving node {node} under {parent} would introduce a cycle")]
    Cycle { node: i32, parent: i32 },
    #[error("forest invariant violated: {0}")]
    Inconsistent(String),
}
