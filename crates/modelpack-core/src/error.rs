//! Error types for modelpack.
//!
//! Every stage of the packaging workflow reports failures through
//! [`ModelpackError`]. Nothing here terminates the process; the CLI decides
//! how a failure is shown and which exit code it maps to.

use crate::reconcile::FileSetDiff;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for modelpack.
#[derive(Debug, Error)]
pub enum ModelpackError {
    // Resolution errors
    #[error(
        "Unknown model name '{model_name}', it should be one of the following: {}",
        .available.join(", ")
    )]
    Configuration {
        model_name: String,
        /// Every model name known to the registry, sorted.
        available: Vec<String>,
    },

    #[error(
        "HuggingFace Hub token is required to download {repo_id}. \
         Please specify it using --hf_token=<your token>"
    )]
    Authentication { repo_id: String },

    #[error("Could not confirm repository {repo_id} at revision {revision}, check repo_id and repo_version")]
    Resolution { repo_id: String, revision: String },

    // Precondition errors
    #[error("Path given for {argument} does not exist: {path}")]
    Path { argument: String, path: PathBuf },

    #[error("{message}")]
    Precondition { message: String },

    #[error("Model files do not match HuggingFace repository {repo_id}@{revision}: {diff}")]
    Reconciliation {
        repo_id: String,
        revision: String,
        diff: FileSetDiff,
    },

    // Packaging errors
    #[error("Generated archive is missing: {0}")]
    MissingArtifact(PathBuf),

    #[error("Archive generation failed: {message}")]
    ArchiveFailed { message: String },

    // Registry file errors
    #[error("Model registry error: {message}")]
    Registry { message: String },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Download failed for {url}: {message}")]
    DownloadFailed { url: String, message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for modelpack operations.
pub type Result<T> = std::result::Result<T, ModelpackError>;

impl From<std::io::Error> for ModelpackError {
    fn from(err: std::io::Error) -> Self {
        ModelpackError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ModelpackError {
    fn from(err: serde_json::Error) -> Self {
        ModelpackError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for ModelpackError {
    fn from(err: reqwest::Error) -> Self {
        ModelpackError::Network {
            message: err.to_string(),
            cause: err.url().map(|u| u.to_string()),
        }
    }
}

impl ModelpackError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ModelpackError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a precondition error from a message.
    pub fn precondition(message: impl Into<String>) -> Self {
        ModelpackError::Precondition {
            message: message.into(),
        }
    }

    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelpackError::Configuration { .. } | ModelpackError::Registry { .. } => {
                "configuration"
            }
            ModelpackError::Authentication { .. } => "authentication",
            ModelpackError::Resolution { .. } => "resolution",
            ModelpackError::Path { .. } => "path",
            ModelpackError::Precondition { .. } => "precondition",
            ModelpackError::Reconciliation { .. } => "reconciliation",
            ModelpackError::MissingArtifact(_) | ModelpackError::ArchiveFailed { .. } => {
                "packaging"
            }
            ModelpackError::Network { .. } | ModelpackError::DownloadFailed { .. } => "network",
            ModelpackError::Io { .. } | ModelpackError::Json { .. } => "io",
        }
    }
}

/// Attach a path to `std::io::Error` results.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| ModelpackError::io_with_path(e, path))
    }
}
