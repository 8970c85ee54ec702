//! Debug node errors.

use flowscope_core::{IdError, NodeId};

/// Errors from managing debug nodes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebugError {
    /// A node with this id is already registered.
    #[error("debug node {0} is already registered")]
    DuplicateNode(NodeId),

    /// No node with this id is registered.
    #[error("no debug node with id {0:?}")]
    UnknownNode(String),

    /// A node id failed validation.
    #[error("invalid node id: {0}")]
    InvalidId(#[from] IdError),
}
