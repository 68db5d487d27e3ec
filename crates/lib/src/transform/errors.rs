//! Error types for delta transformation.

use thiserror::Error;

use crate::model::Version;

/// Structured error types for transformation.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransformError {
    /// The deltas were not computed against the same document version
    #[error("Cannot transform {a} at base version {a_base} against {b} at base version {b_base}")]
    NotConcurrent {
        a: &'static str,
        a_base: Version,
        b: &'static str,
        b_base: Version,
    },
}

impl TransformError {
    /// Check if this error reports deltas with different base versions
    pub fn is_not_concurrent(&self) -> bool {
        matches!(self, TransformError::NotConcurrent { .. })
    }
}

// Conversion from TransformError to the main Error type
impl From<TransformError> for crate::Error {
    fn from(err: TransformError) -> Self {
        crate::Error::Transform(err)
    }
}
