//! Error types for delta construction and lookup.

use thiserror::Error;

use crate::model::{NodeId, Position};

/// Structured error types for delta operations.
///
/// Construction errors are raised before the document is touched: a failed
/// constructor never leaves a partially applied delta behind.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DeltaError {
    /// A split was requested on an element without a parent
    #[error("Cannot split root element {node}")]
    RootSplit { node: NodeId },

    /// The nodes around a merge position cannot be merged
    #[error("Cannot merge at {position}: {reason}")]
    NotMergeable { position: Position, reason: String },

    /// The element given as a wrapper is unusable
    #[error("Invalid wrapper: {reason}")]
    InvalidWrapper { reason: String },

    /// The node cannot be the target of this delta
    #[error("Invalid target {node}: {reason}")]
    InvalidTarget { node: NodeId, reason: String },

    /// No delta variant is registered under this type id
    #[error("Unknown delta type: {type_id}")]
    UnknownType { type_id: String },
}

impl DeltaError {
    /// Check if this error is a split of a root element
    pub fn is_root_split(&self) -> bool {
        matches!(self, DeltaError::RootSplit { .. })
    }

    /// Check if this error was raised while validating a delta's target
    pub fn is_invalid_target(&self) -> bool {
        matches!(
            self,
            DeltaError::RootSplit { .. }
                | DeltaError::NotMergeable { .. }
                | DeltaError::InvalidWrapper { .. }
                | DeltaError::InvalidTarget { .. }
        )
    }

    /// Check if this error is an unknown type id during lookup
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, DeltaError::UnknownType { .. })
    }

    /// Get the node this error refers to, if any
    pub fn node(&self) -> Option<NodeId> {
        match self {
            DeltaError::RootSplit { node } | DeltaError::InvalidTarget { node, .. } => Some(*node),
            _ => None,
        }
    }
}

// Conversion from DeltaError to the main Error type
impl From<DeltaError> for crate::Error {
    fn from(err: DeltaError) -> Self {
        crate::Error::Delta(err)
    }
}
