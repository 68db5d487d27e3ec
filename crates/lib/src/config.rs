//! Document configuration.
//!
//! [`EditorConfig`] describes which roots a [`Document`](crate::Document) is created with.
//! Every replica of a collaborative document must use the same configuration, since root
//! handles are derived from root names.
//!
//! # Example
//!
//! ```
//! use treedelta::{Document, EditorConfig};
//!
//! let config = EditorConfig::from_json(r#"{ "roots": ["main", "title"] }"#).unwrap();
//! let doc = Document::with_config(&config).unwrap();
//! assert!(doc.root("title").is_some());
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    constants::{GRAVEYARD, MAIN_ROOT},
    model::ModelError,
};

/// Root layout of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Names of the roots created with the document, in creation order.
    #[serde(default = "default_roots")]
    pub roots: Vec<String>,

    /// Root returned by [`Document::main_root`](crate::Document::main_root).
    #[serde(default = "default_main_root")]
    pub main_root: String,
}

fn default_roots() -> Vec<String> {
    vec![MAIN_ROOT.to_string()]
}

fn default_main_root() -> String {
    MAIN_ROOT.to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            main_root: default_main_root(),
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check that the configuration describes a usable root layout.
    ///
    /// Roots must be non-empty and unique, may not reuse the graveyard name, and must include
    /// the main root.
    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            return Err(invalid("at least one root is required"));
        }
        for (i, name) in self.roots.iter().enumerate() {
            if name.is_empty() {
                return Err(invalid("root names may not be empty"));
            }
            if name == GRAVEYARD {
                return Err(invalid(format!("root name '{GRAVEYARD}' is reserved")));
            }
            if self.roots[..i].contains(name) {
                return Err(invalid(format!("root '{name}' is listed twice")));
            }
        }
        if !self.roots.contains(&self.main_root) {
            return Err(invalid(format!(
                "main root '{}' is not one of the configured roots",
                self.main_root
            )));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> crate::Error {
    ModelError::InvalidConfig {
        reason: reason.into(),
    }
    .into()
}
