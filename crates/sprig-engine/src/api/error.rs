//! Error types for scene, hierarchy, tween and persistence operations.

use thiserror::Error;
use uuid::Uuid;

use crate::api::types::NodeId;

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Which kind of callback a persisted function name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Draw,
    Update,
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionKind::Draw => f.write_str("draw"),
            FunctionKind::Update => f.write_str("update"),
        }
    }
}

/// Errors reported by the scene graph. None of these are fatal; each one is
/// returned to the caller of the operation that failed.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The handle does not name a live node.
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// `remove_child` was called with a node that is not a child of `parent`.
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// `remove_node` was called with a node that is not in the root list.
    #[error("node {0} is not a root of the scene")]
    NotARoot(NodeId),

    /// The node already has a parent or is already a scene root.
    #[error("node {0} is already attached; detach it first")]
    AlreadyAttached(NodeId),

    /// Attaching `child` under `parent` would make a node its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },

    /// Tween field path does not name a numeric node field.
    #[error("invalid tween field path: {0:?}")]
    InvalidFieldPath(String),

    /// A persisted callback name is not present in the function registry.
    #[error("unknown {kind} function: {name:?}")]
    UnknownFunction { kind: FunctionKind, name: String },

    /// A persisted node names a parent identity that is not in the document.
    #[error("node {node} references unknown parent {parent}")]
    UnknownParent { node: Uuid, parent: Uuid },

    /// Persisted parent links loop back onto themselves.
    #[error("node {0} is its own ancestor")]
    ParentCycle(Uuid),

    /// A persisted document lists the same identity twice.
    #[error("duplicate node identity {0}")]
    DuplicateIdentity(Uuid),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
