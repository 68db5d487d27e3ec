//! Error types for the document tree.
//!
//! These errors describe structural problems: missing nodes, positions that do not resolve,
//! ranges that cross parents and moves that would put a node inside itself.

use thiserror::Error;

use super::NodeId;

/// Structured error types for tree navigation and mutation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    /// No node with this handle exists in the document
    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// The node exists but is a text leaf where an element was required
    #[error("Node {id} is not an element")]
    NotAnElement { id: NodeId },

    /// A position offset lies past the end of its parent
    #[error("Offset {offset} is out of bounds for node {parent} (max offset {max_offset})")]
    OffsetOutOfBounds {
        parent: NodeId,
        offset: usize,
        max_offset: usize,
    },

    /// A range is malformed or does not fit in its parent
    #[error("Invalid range: {reason}")]
    InvalidRange { reason: String },

    /// Inserted content reuses a handle that is already in the document
    #[error("Node already exists: {id}")]
    NodeAlreadyExists { id: NodeId },

    /// A move would place nodes inside themselves
    #[error("Cannot move node {id} into itself")]
    MoveIntoItself { id: NodeId },

    /// No root with this name exists
    #[error("Unknown root: {name}")]
    UnknownRoot { name: String },

    /// The document configuration is unusable
    #[error("Invalid document configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ModelError {
    /// Check if this error indicates a node or root was not found
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ModelError::NodeNotFound { .. } | ModelError::UnknownRoot { .. }
        )
    }

    /// Check if this error is about a position or range that does not resolve
    pub fn is_position_error(&self) -> bool {
        matches!(
            self,
            ModelError::OffsetOutOfBounds { .. }
                | ModelError::InvalidRange { .. }
                | ModelError::MoveIntoItself { .. }
        )
    }

    /// Check if this error is related to configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, ModelError::InvalidConfig { .. })
    }

    /// Get the node handle this error refers to, if any
    pub fn node(&self) -> Option<NodeId> {
        match self {
            ModelError::NodeNotFound { id }
            | ModelError::NotAnElement { id }
            | ModelError::NodeAlreadyExists { id }
            | ModelError::MoveIntoItself { id } => Some(*id),
            ModelError::OffsetOutOfBounds { parent, .. } => Some(*parent),
            _ => None,
        }
    }
}

// Conversion from ModelError to the main Error type
impl From<ModelError> for crate::Error {
    fn from(err: ModelError) -> Self {
        crate::Error::Model(err)
    }
}
