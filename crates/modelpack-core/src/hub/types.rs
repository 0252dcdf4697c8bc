//! HuggingFace API response types.

use serde::{Deserialize, Serialize};

/// A commit in a repository's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash.
    #[serde(rename = "id")]
    pub hash: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub date: String,
}

/// `GET /api/models/{repo_id}/revision/{revision}`, trimmed to what we use.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HfRevisionInfo {
    /// Commit hash the revision resolved to.
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub siblings: Vec<HfSibling>,
}

/// A file entry in [`HfRevisionInfo::siblings`].
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HfSibling {
    pub rfilename: String,
}
