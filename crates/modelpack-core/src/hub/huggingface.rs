//! HuggingFace Hub client.
//!
//! Talks to the public HTTP API directly:
//! - `GET /api/models/{repo}/revision/{rev}` for the file listing
//! - `GET /api/models/{repo}/commits/{rev}` for the commit history
//! - `GET /{repo}/resolve/{rev}/{file}` for file contents

use super::types::{CommitInfo, HfRevisionInfo};
use super::HubClient;
use crate::config::HubConfig;
use crate::error::{IoResultExt, ModelpackError, Result};
use crate::reconcile::ExtensionFilter;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Client for HuggingFace Hub API operations.
pub struct HuggingFaceClient {
    /// HTTP client for API requests (has total timeout)
    client: Client,
    /// HTTP client for downloads (connect timeout only)
    download_client: Client,
    base_url: String,
}

impl std::fmt::Debug for HuggingFaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HuggingFaceClient {
    /// Create a client for the public hub.
    pub fn new() -> Result<Self> {
        Self::with_base_url(HubConfig::BASE_URL)
    }

    /// Create a client for a hub mirror or self-hosted endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let base_url: String = base_url.into();
        let client = Client::builder()
            .timeout(HubConfig::REQUEST_TIMEOUT)
            .user_agent(HubConfig::USER_AGENT)
            .build()
            .map_err(|e| ModelpackError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        let download_client = Client::builder()
            .connect_timeout(HubConfig::DOWNLOAD_CONNECT_TIMEOUT)
            .user_agent(HubConfig::USER_AGENT)
            .build()
            .map_err(|e| ModelpackError::Network {
                message: format!("Failed to create download HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            download_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // repo_id is "owner/model"; its slash belongs to the URL path and must not
    // be encoded. Revisions such as "refs/pr/1" are encoded as one segment.

    pub(crate) fn revision_url(&self, repo_id: &str, revision: &str) -> String {
        format!(
            "{}/api/models/{}/revision/{}",
            self.base_url,
            repo_id,
            urlencoding::encode(revision)
        )
    }

    pub(crate) fn commits_url(&self, repo_id: &str, revision: &str) -> String {
        format!(
            "{}/api/models/{}/commits/{}",
            self.base_url,
            repo_id,
            urlencoding::encode(revision)
        )
    }

    pub(crate) fn resolve_url(&self, repo_id: &str, revision: &str, filename: &str) -> String {
        let encoded: Vec<String> = filename
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/{}/resolve/{}/{}",
            self.base_url,
            repo_id,
            urlencoding::encode(revision),
            encoded.join("/")
        )
    }

    fn authorized(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
    ) -> Result<T> {
        debug!("GET {}", url);
        let response = Self::authorized(self.client.get(url), token)
            .send()
            .await
            .map_err(|e| ModelpackError::Network {
                message: format!("HuggingFace API request failed: {}", e),
                cause: Some(e.to_string()),
            })?;

        if !response.status().is_success() {
            return Err(ModelpackError::Network {
                message: format!("HuggingFace API returned {} for {}", response.status(), url),
                cause: None,
            });
        }

        response.json().await.map_err(|e| ModelpackError::Json {
            message: format!("Failed to parse HuggingFace response: {}", e),
            source: None,
        })
    }

    async fn revision_info(
        &self,
        repo_id: &str,
        revision: &str,
        token: Option<&str>,
    ) -> Result<HfRevisionInfo> {
        self.get_json(&self.revision_url(repo_id, revision), token)
            .await
    }

    /// Stream one file to `dest_path`, going through a `.part` file.
    async fn download_file(&self, url: &str, dest_path: &Path, token: Option<&str>) -> Result<()> {
        use futures::StreamExt;

        if let Some(parent) = dest_path.parent() {
            tokio::fs::create_dir_all(parent).await.with_path(parent)?;
        }
        let part_path = PathBuf::from(format!(
            "{}{}",
            dest_path.display(),
            HubConfig::DOWNLOAD_TEMP_SUFFIX
        ));

        let response = Self::authorized(self.download_client.get(url), token)
            .send()
            .await
            .map_err(|e| ModelpackError::Network {
                message: format!("Download request failed: {}", e),
                cause: Some(e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelpackError::DownloadFailed {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let expected = response.content_length();
        let mut file = tokio::fs::File::create(&part_path)
            .await
            .with_path(&part_path)?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ModelpackError::Network {
                message: format!("Download stream error: {}", e),
                cause: Some(e.to_string()),
            })?;
            file.write_all(&chunk).await.with_path(&part_path)?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await.with_path(&part_path)?;
        drop(file);

        if let Some(total) = expected {
            if downloaded != total {
                return Err(ModelpackError::DownloadFailed {
                    url: url.to_string(),
                    message: format!("Incomplete download: got {} of {} bytes", downloaded, total),
                });
            }
        }

        tokio::fs::rename(&part_path, dest_path)
            .await
            .map_err(|e| ModelpackError::DownloadFailed {
                url: url.to_string(),
                message: format!("Failed to rename temp file: {}", e),
            })?;
        Ok(())
    }
}

/// Whether a repository filename resolves to a path below the download directory.
fn is_contained_relative(filename: &str) -> bool {
    !filename.is_empty()
        && Path::new(filename)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

#[async_trait]
impl HubClient for HuggingFaceClient {
    async fn list_repo_files(
        &self,
        repo_id: &str,
        revision: &str,
        token: Option<&str>,
    ) -> Result<Vec<String>> {
        let info = self.revision_info(repo_id, revision, token).await?;
        Ok(info.siblings.into_iter().map(|s| s.rfilename).collect())
    }

    async fn list_repo_commits(
        &self,
        repo_id: &str,
        revision: &str,
        token: Option<&str>,
    ) -> Result<Vec<CommitInfo>> {
        self.get_json(&self.commits_url(repo_id, revision), token)
            .await
    }

    async fn snapshot_download(
        &self,
        repo_id: &str,
        revision: &str,
        local_dir: &Path,
        token: Option<&str>,
        ignore: &ExtensionFilter,
    ) -> Result<Vec<PathBuf>> {
        let info = self.revision_info(repo_id, revision, token).await?;
        // Pin every file to the commit the revision resolved to.
        let commit = info.sha.unwrap_or_else(|| revision.to_string());

        let all: Vec<String> = info.siblings.into_iter().map(|s| s.rfilename).collect();
        let total = all.len();
        let wanted = ignore.retain_wanted(all);
        if let Some(escaping) = wanted.iter().find(|name| !is_contained_relative(name)) {
            return Err(ModelpackError::DownloadFailed {
                url: self.resolve_url(repo_id, &commit, escaping),
                message: format!(
                    "Refusing to write {} outside {}",
                    escaping,
                    local_dir.display()
                ),
            });
        }
        info!(
            "Downloading {} of {} file(s) from {}@{} (ignoring {:?})",
            wanted.len(),
            total,
            repo_id,
            commit,
            ignore.glob_patterns()
        );

        let mut written = Vec::with_capacity(wanted.len());
        for (idx, filename) in wanted.iter().enumerate() {
            let url = self.resolve_url(repo_id, &commit, filename);
            let dest_path = local_dir.join(filename);
            self.download_file(&url, &dest_path, token).await?;
            info!(
                "File {}/{} complete ({}/{})",
                repo_id,
                filename,
                idx + 1,
                wanted.len()
            );
            written.push(dest_path);
        }

        Ok(written)
    }
}
