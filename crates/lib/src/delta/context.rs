//! Explicit editing context handed to delta constructors.

use super::DeltaVariant;
use crate::{Document, Result, model::Version, operation::Operation};

/// Mutable access to the document a delta is being built against.
///
/// Constructors read the current version from the context, stamp it on each operation they
/// generate and apply the operation right away, so that later operations of the same delta
/// are computed against the document as already modified.
pub struct EditContext<'doc> {
    document: &'doc mut Document,
}

impl<'doc> EditContext<'doc> {
    pub fn new(document: &'doc mut Document) -> Self {
        Self { document }
    }

    /// The version the next operation must be based on.
    pub fn version(&self) -> Version {
        self.document.version()
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    /// Applies `operation` and, once it succeeded, appends it to `delta`.
    pub fn apply<D: DeltaVariant>(&mut self, delta: &mut D, operation: Operation) -> Result<()> {
        self.document.apply_operation(&operation)?;
        delta.add_operation(operation);
        Ok(())
    }

    /// Runs `f`, restoring the document to its current state if `f` fails.
    pub fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.document.clone();
        let result = f(self);
        if let Err(err) = &result {
            tracing::warn!(
                version = snapshot.version(),
                error = %err,
                "Delta construction failed, restoring document"
            );
            *self.document = snapshot;
        }
        result
    }
}
