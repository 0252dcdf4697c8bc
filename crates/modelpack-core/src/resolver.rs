//! Model name to hub repository resolution.

use crate::config::HubConfig;
use crate::error::{ModelpackError, Result};
use crate::hub::HubClient;
use crate::registry::ModelRegistry;
use crate::request::ModelRequest;
use tracing::{debug, info};

/// A confirmed repository and revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub repo_id: String,
    pub repo_version: String,
}

/// Whether `repo_id` lives in a namespace that requires an access token.
pub fn requires_token(repo_id: &str) -> bool {
    repo_id.starts_with(HubConfig::PRIVILEGED_REPO_PREFIX)
}

/// Resolves model names through the registry and confirms them on the hub.
pub struct ModelResolver<'a> {
    registry: &'a ModelRegistry,
    hub: &'a dyn HubClient,
}

impl<'a> ModelResolver<'a> {
    pub fn new(registry: &'a ModelRegistry, hub: &'a dyn HubClient) -> Self {
        Self { registry, hub }
    }

    /// Resolve `model_name`, with an optional revision override (empty means default).
    pub async fn resolve(
        &self,
        model_name: &str,
        revision_override: &str,
        token: Option<&str>,
    ) -> Result<ResolvedModel> {
        let entry = self.registry.lookup(model_name)?;

        let repo_version = if revision_override.is_empty() {
            entry.default_repo_version.clone()
        } else {
            revision_override.to_string()
        };

        if requires_token(&entry.repo_id) && token.is_none() {
            return Err(ModelpackError::Authentication {
                repo_id: entry.repo_id.clone(),
            });
        }

        match self
            .hub
            .list_repo_commits(&entry.repo_id, &repo_version, token)
            .await
        {
            Ok(commits) => {
                debug!(
                    "{}@{} confirmed ({} commit(s))",
                    entry.repo_id,
                    repo_version,
                    commits.len()
                );
            }
            Err(e) => {
                debug!("Commit listing failed for {}@{}: {}", entry.repo_id, repo_version, e);
                return Err(ModelpackError::Resolution {
                    repo_id: entry.repo_id.clone(),
                    revision: repo_version,
                });
            }
        }

        info!(
            "Resolved model {} to {} at revision {}",
            model_name, entry.repo_id, repo_version
        );
        Ok(ResolvedModel {
            repo_id: entry.repo_id.clone(),
            repo_version,
        })
    }

    /// Resolve the request's model and write the result back into it.
    pub async fn resolve_request(&self, request: &mut ModelRequest) -> Result<()> {
        let resolved = self
            .resolve(&request.model_name, &request.repo_version, request.token())
            .await?;
        request.repo_id = resolved.repo_id;
        request.repo_version = resolved.repo_version;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::CommitInfo;
    use crate::reconcile::ExtensionFilter;
    use crate::registry::RegistryEntry;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Records commit lookups; knows a single repo at a single revision.
    #[derive(Default)]
    struct RecordingHub {
        calls: Mutex<Vec<(String, String, Option<String>)>>,
    }

    #[async_trait]
    impl HubClient for RecordingHub {
        async fn list_repo_files(&self, _: &str, _: &str, _: Option<&str>) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn list_repo_commits(
            &self,
            repo_id: &str,
            revision: &str,
            token: Option<&str>,
        ) -> Result<Vec<CommitInfo>> {
            self.calls.lock().unwrap().push((
                repo_id.to_string(),
                revision.to_string(),
                token.map(String::from),
            ));
            if revision == "v1" || revision == "abc123" {
                Ok(vec![CommitInfo {
                    hash: "abc123".into(),
                    title: "init".into(),
                    message: String::new(),
                    date: String::new(),
                }])
            } else {
                Err(ModelpackError::Network {
                    message: "HuggingFace API returned 404 Not Found".into(),
                    cause: None,
                })
            }
        }

        async fn snapshot_download(
            &self,
            _: &str,
            _: &str,
            _: &Path,
            _: Option<&str>,
            _: &ExtensionFilter,
        ) -> Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }

    fn registry() -> ModelRegistry {
        ModelRegistry::from_entries([
            (
                "gpt2-small".to_string(),
                RegistryEntry {
                    repo_id: "org/gpt2-small".into(),
                    default_repo_version: "v1".into(),
                    handler_reference: "handler.py".into(),
                },
            ),
            (
                "llama2_7b".to_string(),
                RegistryEntry {
                    repo_id: "meta-llama/Llama-2-7b-hf".into(),
                    default_repo_version: "abc123".into(),
                    handler_reference: "handler.py".into(),
                },
            ),
        ])
    }

    #[tokio::test]
    async fn test_default_revision_is_used() {
        let registry = registry();
        let hub = RecordingHub::default();
        let resolved = ModelResolver::new(&registry, &hub)
            .resolve("gpt2-small", "", None)
            .await
            .unwrap();
        assert_eq!(resolved.repo_id, "org/gpt2-small");
        assert_eq!(resolved.repo_version, "v1");
    }

    #[tokio::test]
    async fn test_unknown_model_lists_registry_keys() {
        let registry = registry();
        let hub = RecordingHub::default();
        let err = ModelResolver::new(&registry, &hub)
            .resolve("bert", "", None)
            .await
            .unwrap_err();
        match err {
            ModelpackError::Configuration { available, .. } => {
                assert_eq!(available, registry.model_names());
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
        assert!(hub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_privileged_repo_without_token_makes_no_remote_call() {
        let registry = registry();
        let hub = RecordingHub::default();
        let err = ModelResolver::new(&registry, &hub)
            .resolve("llama2_7b", "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelpackError::Authentication { .. }));
        assert!(hub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_privileged_repo_with_token_passes_token() {
        let registry = registry();
        let hub = RecordingHub::default();
        ModelResolver::new(&registry, &hub)
            .resolve("llama2_7b", "", Some("hf_token"))
            .await
            .unwrap();
        let calls = hub.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].2.as_deref(), Some("hf_token"));
    }

    #[tokio::test]
    async fn test_unknown_revision_is_resolution_error() {
        let registry = registry();
        let hub = RecordingHub::default();
        let err = ModelResolver::new(&registry, &hub)
            .resolve("gpt2-small", "does-not-exist", None)
            .await
            .unwrap_err();
        match err {
            ModelpackError::Resolution { repo_id, revision } => {
                assert_eq!(repo_id, "org/gpt2-small");
                assert_eq!(revision, "does-not-exist");
            }
            other => panic!("expected resolution error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_request_fills_fields() {
        let registry = registry();
        let hub = RecordingHub::default();
        let mut request = ModelRequest::new("gpt2-small", "/models", "/mars");
        ModelResolver::new(&registry, &hub)
            .resolve_request(&mut request)
            .await
            .unwrap();
        assert_eq!(request.repo_id, "org/gpt2-small");
        assert_eq!(request.repo_version, "v1");
    }

    #[test]
    fn test_requires_token() {
        assert!(requires_token("meta-llama/Llama-2-7b-hf"));
        assert!(!requires_token("openai-community/gpt2"));
    }
}
