//!
//! treedelta: reversible, transformable structural edits for collaborative tree editing.
//!
//! ## Core Concepts
//!
//! * **Documents (`model::Document`)**: An arena of element and text nodes addressed by stable
//!   [`NodeId`] handles, with named roots, a graveyard root for removed content and a monotonic
//!   version counter.
//! * **Operations (`operation::Operation`)**: The smallest invertible mutations (insert, move,
//!   remove, reinsert, attribute change, rename, no-op). Each one declares the document version it
//!   was computed against and refuses to apply anywhere else.
//! * **Deltas (`delta::Delta`)**: Named, ordered bundles of operations forming one semantic edit.
//!   Split and merge (and wrap and unwrap) are dual pairs: reversing one yields the other.
//! * **Batches (`batch::Batch`)**: Group the deltas of one user action and drive their creation
//!   through an explicit [`EditContext`].
//! * **Transformation (`transform`)**: Rewrites a delta computed against the same base version as
//!   another so that both application orders converge to the same tree. Sticky moves and per-kind
//!   priorities decide contested positions.
//!
//! ```
//! use treedelta::{Batch, Document, model::{NodeData, Position}};
//!
//! let mut doc = Document::new();
//! let root = doc.main_root();
//! let paragraph = NodeData::element("p").with_children(vec![
//!     NodeData::text("a"),
//!     NodeData::text("b"),
//!     NodeData::text("c"),
//! ]);
//! let p = paragraph.id();
//!
//! let mut batch = Batch::new(&mut doc);
//! batch.insert(Position::new(root, 0), vec![paragraph]).unwrap();
//! batch.split(Position::new(p, 1)).unwrap();
//! let deltas = batch.into_deltas();
//!
//! assert_eq!(doc.render(root), "<main><p>a</p><p>bc</p></main>");
//!
//! doc.apply_delta(&deltas[1].get_reversed()).unwrap();
//! assert_eq!(doc.render(root), "<main><p>abc</p></main>");
//! ```

pub mod batch;
pub mod config;
pub mod constants;
pub mod delta;
pub mod model;
pub mod operation;
pub mod transform;

pub use batch::Batch;
pub use config::EditorConfig;
pub use delta::{Delta, DeltaKind, EditContext, Registered};
pub use model::{Document, NodeId, Version};
pub use operation::Operation;

/// Result type used throughout the treedelta library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the treedelta library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured tree errors from the model module
    #[error(transparent)]
    Model(model::ModelError),

    /// Structured operation errors from the operation module
    #[error(transparent)]
    Operation(operation::OperationError),

    /// Structured delta errors from the delta module
    #[error(transparent)]
    Delta(delta::DeltaError),

    /// Structured transformation errors from the transform module
    #[error(transparent)]
    Transform(transform::TransformError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Model(_) => "model",
            Error::Operation(_) => "operation",
            Error::Delta(_) => "delta",
            Error::Transform(_) => "transform",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a node or root was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Model(model_err) => model_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is an operation applied against the wrong document version.
    ///
    /// Callers are expected to re-transform and retry; the library never does so itself.
    pub fn is_version_mismatch(&self) -> bool {
        match self {
            Error::Operation(op_err) => op_err.is_version_mismatch(),
            _ => false,
        }
    }

    /// Check if this error is a split requested on a root element.
    pub fn is_root_split(&self) -> bool {
        match self {
            Error::Delta(delta_err) => delta_err.is_root_split(),
            _ => false,
        }
    }

    /// Check if this error reports an invalid position or range.
    pub fn is_invalid_position(&self) -> bool {
        match self {
            Error::Model(model_err) => model_err.is_position_error(),
            _ => false,
        }
    }

    /// Check if this error is serialization-related.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
            || matches!(self, Error::Delta(delta_err) if delta_err.is_unknown_type())
    }
}
