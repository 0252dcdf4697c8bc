//! Model hub access.
//!
//! [`HubClient`] is the seam between the packaging workflow and the remote
//! hub. [`HuggingFaceClient`] implements it over the HuggingFace HTTP API;
//! tests substitute in-memory implementations.
//!
//! - [`types`] - API response structs
//! - [`auth`] - access token resolution
//! - [`huggingface`] - HTTP client and snapshot download

mod auth;
mod huggingface;
mod types;

pub use auth::{resolve_token, TokenSource};
pub use huggingface::HuggingFaceClient;
pub use types::CommitInfo;

use crate::error::Result;
use crate::reconcile::ExtensionFilter;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Remote repository operations used by the packaging workflow.
#[async_trait]
pub trait HubClient: Send + Sync {
    /// Every file path in the repository at `revision`.
    async fn list_repo_files(
        &self,
        repo_id: &str,
        revision: &str,
        token: Option<&str>,
    ) -> Result<Vec<String>>;

    /// Commit history of the repository up to `revision`.
    ///
    /// Fails when the repository or the revision does not exist.
    async fn list_repo_commits(
        &self,
        repo_id: &str,
        revision: &str,
        token: Option<&str>,
    ) -> Result<Vec<CommitInfo>>;

    /// Download every file of the repository at `revision` into `local_dir`,
    /// skipping files matched by `ignore`. Returns the written paths.
    async fn snapshot_download(
        &self,
        repo_id: &str,
        revision: &str,
        local_dir: &Path,
        token: Option<&str>,
        ignore: &ExtensionFilter,
    ) -> Result<Vec<PathBuf>>;
}
