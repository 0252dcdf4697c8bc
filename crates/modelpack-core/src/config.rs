//! Centralized configuration for modelpack.
//!
//! Constants for HuggingFace Hub access, download staging, and archive
//! packaging. Per-model configuration lives in the registry file instead
//! (see [`crate::registry`]).

use std::time::Duration;

/// HuggingFace Hub access.
pub struct HubConfig;

impl HubConfig {
    pub const BASE_URL: &'static str = "https://huggingface.co";
    pub const USER_AGENT: &'static str = "modelpack/0.1";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    /// Downloads only bound the connect phase; multi-gigabyte files outlive any total timeout.
    pub const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DOWNLOAD_TEMP_SUFFIX: &'static str = ".part";
    /// Repositories under this namespace are gated and need an access token.
    pub const PRIVILEGED_REPO_PREFIX: &'static str = "meta-llama";
    pub const TOKEN_ENV_VAR: &'static str = "HF_TOKEN";
}

/// Archive packaging.
pub struct PackagingConfig;

impl PackagingConfig {
    /// Weight formats the archive handler does not load.
    pub const IGNORED_EXTENSIONS: &'static [&'static str] =
        &[".safetensors", ".safetensors.index.json"];
    pub const ARCHIVE_EXTENSION: &'static str = "mar";
    pub const STAGING_DIR_PREFIX: &'static str = "tmp";
    pub const ARCHIVER_PROGRAM: &'static str = "torch-model-archiver";
    pub const REGISTRY_FILENAME: &'static str = "model_config.json";
    pub const REGISTRY_ENV_VAR: &'static str = "MODELPACK_MODEL_CONFIG";
}

/// `<model_name>.mar`, the name the archive generator writes.
pub fn generated_archive_name(model_name: &str) -> String {
    format!("{}.{}", model_name, PackagingConfig::ARCHIVE_EXTENSION)
}

/// A revision as a single file-name component.
///
/// Branch and PR revisions such as `refs/pr/1` carry path separators; each
/// one becomes `--`, so `refs/pr/1` maps to `refs--pr--1`.
pub fn revision_file_component(revision: &str) -> String {
    revision.replace(['/', '\\'], "--")
}

/// `<model_name>_<revision>.mar`, the name of the final archive.
pub fn versioned_archive_name(model_name: &str, revision: &str) -> String {
    format!(
        "{}_{}.{}",
        model_name,
        revision_file_component(revision),
        PackagingConfig::ARCHIVE_EXTENSION
    )
}
