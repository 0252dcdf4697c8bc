//! Model registry: logical model names mapped to hub repositories.
//!
//! Loaded once from a JSON file of the form
//!
//! ```json
//! {
//!   "gpt2-small": {
//!     "repo_id": "org/gpt2-small",
//!     "repo_version": "v1",
//!     "handler": "handlers/gpt2_handler.py"
//!   }
//! }
//! ```
//!
//! The registry is read-only after loading and is passed explicitly to the
//! components that need it.

use crate::error::{IoResultExt, ModelpackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single registered model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// HuggingFace repository, `owner/name`.
    pub repo_id: String,
    /// Revision used when the caller does not ask for one.
    #[serde(rename = "repo_version")]
    pub default_repo_version: String,
    /// Handler path, relative to the registry file's directory unless absolute.
    #[serde(rename = "handler", default)]
    pub handler_reference: String,
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, RegistryEntry>,
    /// File the registry was loaded from, if any.
    source: Option<PathBuf>,
}

impl ModelRegistry {
    /// Build a registry from in-memory entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, RegistryEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            source: None,
        }
    }

    /// Load a registry from its JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ModelpackError::Registry {
                message: format!("model config file not found: {}", path.display()),
            });
        }

        let contents = std::fs::read_to_string(path).with_path(path)?;
        let mut registry = Self::from_json(&contents).map_err(|e| ModelpackError::Registry {
            message: format!("failed to parse {}: {}", path.display(), e),
        })?;
        registry.source = Some(path.to_path_buf());

        debug!(
            "Loaded {} model(s) from {}",
            registry.entries.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Parse a registry from JSON text.
    pub fn from_json(contents: &str) -> std::result::Result<Self, serde_json::Error> {
        let entries: BTreeMap<String, RegistryEntry> = serde_json::from_str(contents)?;
        Ok(Self {
            entries,
            source: None,
        })
    }

    pub fn get(&self, model_name: &str) -> Option<&RegistryEntry> {
        self.entries.get(model_name)
    }

    /// Look up a model, failing with the list of known names.
    pub fn lookup(&self, model_name: &str) -> Result<&RegistryEntry> {
        self.entries
            .get(model_name)
            .ok_or_else(|| ModelpackError::Configuration {
                model_name: model_name.to_string(),
                available: self.model_names(),
            })
    }

    /// All registered model names, sorted.
    pub fn model_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the file this registry was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Resolve a model's handler to a filesystem path.
    ///
    /// Relative handler references are joined onto the registry file's
    /// directory. Returns `None` for unknown models or empty references.
    pub fn handler_path(&self, model_name: &str) -> Option<PathBuf> {
        let entry = self.entries.get(model_name)?;
        if entry.handler_reference.is_empty() {
            return None;
        }

        let handler = Path::new(&entry.handler_reference);
        if handler.is_absolute() {
            return Some(handler.to_path_buf());
        }

        let base = self
            .source
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""));
        Some(base.join(handler))
    }
}
