//! Reconciliation of local model files against a hub repository manifest.
//!
//! A download is accepted only when the files present in the model directory
//! are exactly the repository's files minus ignored extensions, compared as
//! multisets.

use crate::config::PackagingConfig;
use crate::error::{IoResultExt, Result};
use crate::hub::HubClient;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Suffix filter for filenames.
///
/// Each extension is escaped and anchored at the end of the name, so `.bin`
/// matches `model.bin` but neither `foo.binary` nor `model.bin.old`.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
    pattern: Option<Regex>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions: Vec<String> = extensions.into_iter().map(Into::into).collect();
        let pattern = if extensions.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = extensions
                .iter()
                .map(|ext| format!("{}$", regex::escape(ext)))
                .collect();
            // Escaped literals joined by `|` always form a valid pattern.
            Regex::new(&alternatives.join("|")).ok()
        };
        Self {
            extensions,
            pattern,
        }
    }

    /// Whether `filename` ends with one of the ignored extensions.
    pub fn is_ignored(&self, filename: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(filename))
    }

    /// Drop every ignored filename, keeping order.
    pub fn retain_wanted(&self, filenames: Vec<String>) -> Vec<String> {
        filenames
            .into_iter()
            .filter(|name| !self.is_ignored(name))
            .collect()
    }

    /// Glob patterns equivalent to this filter (`*<ext>`), for logging.
    pub fn glob_patterns(&self) -> Vec<String> {
        self.extensions.iter().map(|ext| format!("*{}", ext)).collect()
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(PackagingConfig::IGNORED_EXTENSIONS.iter().copied())
    }
}

fn counts(names: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for name in names {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Multiset equality: same names with the same multiplicities, any order.
pub fn same_file_multiset(left: &[String], right: &[String]) -> bool {
    left.len() == right.len() && counts(left) == counts(right)
}

/// Difference between the local and the expected remote file lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSetDiff {
    /// Expected from the repository but absent (or too few copies) locally.
    pub missing_locally: Vec<String>,
    /// Present locally but not expected (or too many copies).
    pub unexpected_locally: Vec<String>,
}

impl FileSetDiff {
    /// Compute the multiset difference in both directions.
    pub fn between(local: &[String], remote: &[String]) -> Self {
        let local_counts = counts(local);
        let remote_counts = counts(remote);

        let mut missing_locally = Vec::new();
        for (name, &expected) in &remote_counts {
            let present = local_counts.get(name).copied().unwrap_or(0);
            for _ in present..expected {
                missing_locally.push((*name).to_string());
            }
        }

        let mut unexpected_locally = Vec::new();
        for (name, &present) in &local_counts {
            let expected = remote_counts.get(name).copied().unwrap_or(0);
            for _ in expected..present {
                unexpected_locally.push((*name).to_string());
            }
        }

        missing_locally.sort();
        unexpected_locally.sort();
        Self {
            missing_locally,
            unexpected_locally,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing_locally.is_empty() && self.unexpected_locally.is_empty()
    }
}

impl fmt::Display for FileSetDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no differences");
        }
        let mut parts = Vec::new();
        if !self.missing_locally.is_empty() {
            parts.push(format!("missing locally [{}]", self.missing_locally.join(", ")));
        }
        if !self.unexpected_locally.is_empty() {
            parts.push(format!(
                "unexpected locally [{}]",
                self.unexpected_locally.join(", ")
            ));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Outcome of a reconciliation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub matches: bool,
    pub diff: FileSetDiff,
}

/// Names of the top-level entries of `dir`.
pub fn list_local_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Compare a local listing against a remote listing after filtering.
pub fn compare_listings(
    local: &[String],
    remote: Vec<String>,
    filter: &ExtensionFilter,
) -> Reconciliation {
    let expected = filter.retain_wanted(remote);
    if same_file_multiset(local, &expected) {
        Reconciliation {
            matches: true,
            diff: FileSetDiff::default(),
        }
    } else {
        Reconciliation {
            matches: false,
            diff: FileSetDiff::between(local, &expected),
        }
    }
}

/// Check the model directory against the repository's file listing.
///
/// Makes one remote listing call and never touches the filesystem beyond
/// reading the directory.
pub async fn reconcile_model_files(
    hub: &dyn HubClient,
    model_path: &Path,
    repo_id: &str,
    revision: &str,
    token: Option<&str>,
    filter: &ExtensionFilter,
) -> Result<Reconciliation> {
    let local = list_local_files(model_path)?;
    let remote = hub.list_repo_files(repo_id, revision, token).await?;
    debug!(
        "Reconciling {} local file(s) against {} remote file(s) for {}@{}",
        local.len(),
        remote.len(),
        repo_id,
        revision
    );

    let outcome = compare_listings(&local, remote, filter);
    if outcome.matches {
        info!("Model files match {}@{}", repo_id, revision);
    }
    Ok(outcome)
}
