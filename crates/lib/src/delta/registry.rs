//! Type registry and serialized form of deltas
//!
//! Every delta variant declares a stable type identifier through [`Registered`]. The
//! identifier is what external collaborators persist or exchange; [`DeltaKind::from_type_id`]
//! maps it back to a variant. [`DeltaRecord`] is the deterministic serde form of a delta: its
//! type identifier plus its operations in execution order.

use serde::{Deserialize, Serialize};

use super::{Delta, DeltaError, DeltaKind};
use crate::{Result, operation::Operation};

/// Trait for types that can be registered under a stable type identifier.
///
/// # Example
///
/// ```
/// use treedelta::Registered;
///
/// struct MyDelta;
///
/// impl Registered for MyDelta {
///     fn type_id() -> &'static str {
///         "mydelta:v0"
///     }
/// }
///
/// assert_eq!(MyDelta::type_id(), "mydelta:v0");
/// assert!(MyDelta::supports_type_id("mydelta:v0"));
/// assert!(!MyDelta::supports_type_id("other:v0"));
/// ```
pub trait Registered {
    /// Returns a unique identifier for this type.
    ///
    /// The format is `"name:version"` (e.g., `"split:v0"`).
    fn type_id() -> &'static str;

    /// Check if this type can be loaded from a stored type_id.
    ///
    /// Override this method to accept identifiers written by older versions.
    fn supports_type_id(type_id: &str) -> bool {
        type_id == Self::type_id()
    }
}

/// Serialized form of a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRecord {
    /// The type identifier (e.g., "split:v0", "merge:v0")
    #[serde(rename = "type")]
    pub type_id: String,

    /// Operations in execution order
    pub operations: Vec<Operation>,
}

impl DeltaKind {
    /// Looks up the variant registered under `type_id`.
    pub fn from_type_id(type_id: &str) -> Option<DeltaKind> {
        DeltaKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.supports_type_id(type_id))
    }

    /// Like [`DeltaKind::from_type_id`], with an error naming the unknown identifier.
    pub fn require(type_id: &str) -> Result<DeltaKind> {
        Self::from_type_id(type_id).ok_or_else(|| {
            DeltaError::UnknownType {
                type_id: type_id.to_string(),
            }
            .into()
        })
    }
}

impl Delta {
    /// The serializable record of this delta.
    pub fn to_record(&self) -> DeltaRecord {
        DeltaRecord {
            type_id: self.type_id().to_string(),
            operations: self.operations().to_vec(),
        }
    }

    /// Rebuilds a delta from its record, dispatching on the type identifier.
    pub fn from_record(record: DeltaRecord) -> Result<Delta> {
        let kind = DeltaKind::require(&record.type_id)?;
        Ok(Delta::from_operations(kind, record.operations))
    }

    /// JSON form of [`Delta::to_record`].
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    /// Parses the JSON form produced by [`Delta::to_json`].
    pub fn from_json(json: &str) -> Result<Delta> {
        let record: DeltaRecord = serde_json::from_str(json)?;
        Self::from_record(record)
    }
}
