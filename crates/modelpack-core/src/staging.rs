//! Staging directory for archive generation.
//!
//! The archive generator writes into `tmp_<model>_<revision>` inside the
//! output directory. [`StagingDir`] owns that directory and removes it when
//! dropped, so a failed run never leaves one behind.

use crate::config::{
    generated_archive_name, revision_file_component, versioned_archive_name, PackagingConfig,
};
use crate::error::{IoResultExt, ModelpackError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// `tmp_<model_name>_<revision>`, with the revision flattened to one component.
pub fn staging_dir_name(model_name: &str, revision: &str) -> String {
    format!(
        "{}_{}_{}",
        PackagingConfig::STAGING_DIR_PREFIX,
        model_name,
        revision_file_component(revision)
    )
}

/// Path of the final archive for `model_name` at `revision`.
pub fn final_archive_path(output_dir: &Path, model_name: &str, revision: &str) -> PathBuf {
    output_dir.join(versioned_archive_name(model_name, revision))
}

/// A staging directory, removed on drop.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove(&self) -> std::io::Result<()> {
        match std::fs::remove_dir_all(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            warn!(
                "Failed to remove staging directory {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Create a fresh, empty staging directory, discarding any leftover one.
pub fn begin(output_dir: &Path, model_name: &str, revision: &str) -> Result<StagingDir> {
    let path = output_dir.join(staging_dir_name(model_name, revision));

    if path.exists() {
        debug!("Removing leftover staging directory {}", path.display());
        std::fs::remove_dir_all(&path).with_path(&path)?;
    }
    std::fs::create_dir_all(&path).with_path(&path)?;

    debug!("Created staging directory {}", path.display());
    Ok(StagingDir { path })
}

/// Move the generated archive out of staging under its versioned name.
///
/// The staging directory, including any other generated files, is removed
/// whether or not the archive was found.
pub fn finalize(
    staging: StagingDir,
    output_dir: &Path,
    model_name: &str,
    revision: &str,
) -> Result<PathBuf> {
    let src = staging.path().join(generated_archive_name(model_name));
    if !src.is_file() {
        return Err(ModelpackError::MissingArtifact(src));
    }

    let dst = final_archive_path(output_dir, model_name, revision);
    std::fs::rename(&src, &dst).with_path(&dst)?;
    info!("Archive written to {}", dst.display());

    staging.remove().with_path(staging.path())?;
    Ok(dst)
}
