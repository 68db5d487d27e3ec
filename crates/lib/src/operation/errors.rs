//! Error types for applying operations.

use thiserror::Error;

use crate::model::{AttributeValue, NodeId, Version};

/// Structured error types for operation application.
///
/// Structural problems (missing nodes, bad offsets) are reported as
/// [`ModelError`](crate::model::ModelError); this enum covers what is specific to operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OperationError {
    /// The operation was computed against a different document version
    #[error("{operation} operation expects base version {expected}, document is at {actual}")]
    VersionMismatch {
        operation: &'static str,
        expected: Version,
        actual: Version,
    },

    /// The attribute does not hold the value the operation was computed against
    #[error("Attribute '{key}' on node {node} is {actual:?}, expected {expected:?}")]
    AttributeMismatch {
        node: NodeId,
        key: String,
        expected: Option<AttributeValue>,
        actual: Option<AttributeValue>,
    },

    /// The element does not have the name the rename was computed against
    #[error("Node {node} is named '{actual}', expected '{expected}'")]
    NameMismatch {
        node: NodeId,
        expected: String,
        actual: String,
    },

    /// The node cannot be renamed
    #[error("Cannot rename node {node}: {reason}")]
    InvalidRenameTarget { node: NodeId, reason: String },
}

impl OperationError {
    /// Check if this error is a base-version mismatch
    pub fn is_version_mismatch(&self) -> bool {
        matches!(self, OperationError::VersionMismatch { .. })
    }

    /// Check if this error reports a stale value (attribute or name)
    pub fn is_stale_value(&self) -> bool {
        matches!(
            self,
            OperationError::AttributeMismatch { .. } | OperationError::NameMismatch { .. }
        )
    }

    /// Get the (expected, actual) versions if this is a version mismatch
    pub fn versions(&self) -> Option<(Version, Version)> {
        match self {
            OperationError::VersionMismatch {
                expected, actual, ..
            } => Some((*expected, *actual)),
            _ => None,
        }
    }
}

// Conversion from OperationError to the main Error type
impl From<OperationError> for crate::Error {
    fn from(err: OperationError) -> Self {
        crate::Error::Operation(err)
    }
}
