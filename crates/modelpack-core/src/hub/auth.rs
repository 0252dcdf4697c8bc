//! HuggingFace access token resolution.
//!
//! An explicit token always wins. Otherwise the `HF_TOKEN` environment
//! variable and the HuggingFace CLI token file are consulted, in that order.

use crate::config::HubConfig;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where an access token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Argument,
    EnvVar,
    HfCache,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenSource::Argument => "command line",
            TokenSource::EnvVar => "env_var",
            TokenSource::HfCache => "hf_cache",
        };
        write!(f, "{}", label)
    }
}

/// `~/.cache/huggingface/token`, written by `huggingface-cli login`.
fn hf_cache_token_path(home: &Path) -> PathBuf {
    home.join(".cache").join("huggingface").join("token")
}

fn non_empty(token: &str) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Resolve an access token.
///
/// `home` is the user's home directory; pass `None` to skip the CLI cache.
pub fn resolve_token(
    explicit: Option<&str>,
    home: Option<&Path>,
) -> Option<(String, TokenSource)> {
    if let Some(token) = explicit.and_then(non_empty) {
        return Some((token, TokenSource::Argument));
    }

    if let Some(token) = std::env::var(HubConfig::TOKEN_ENV_VAR)
        .ok()
        .as_deref()
        .and_then(non_empty)
    {
        return Some((token, TokenSource::EnvVar));
    }

    let path = hf_cache_token_path(home?);
    std::fs::read_to_string(path)
        .ok()
        .as_deref()
        .and_then(non_empty)
        .map(|token| (token, TokenSource::HfCache))
}
