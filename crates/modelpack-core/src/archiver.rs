//! Archive generation.
//!
//! [`TorchModelArchiver`] drives the external `torch-model-archiver` tool,
//! which writes `<model_name>.mar` into the export directory it is given.

use crate::config::PackagingConfig;
use crate::error::{ModelpackError, Result};
use crate::reconcile::list_local_files;
use crate::request::ModelRequest;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Produces a model archive from a resolved request.
#[async_trait]
pub trait ArchiveGenerator: Send + Sync {
    /// Write `<model_name>.mar` into `target_dir`.
    ///
    /// `config_path` is the model registry file the request was resolved
    /// against, if it came from disk.
    async fn generate(
        &self,
        request: &ModelRequest,
        config_path: Option<&Path>,
        target_dir: &Path,
        debug: bool,
    ) -> Result<()>;
}

/// Runs `torch-model-archiver`.
#[derive(Debug, Clone)]
pub struct TorchModelArchiver {
    program: PathBuf,
}

impl Default for TorchModelArchiver {
    fn default() -> Self {
        Self {
            program: PathBuf::from(PackagingConfig::ARCHIVER_PROGRAM),
        }
    }
}

impl TorchModelArchiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different archiver executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for one archive.
    ///
    /// Every top-level file of the model directory is bundled as an extra
    /// file, followed by the registry file when there is one.
    pub fn build_args(
        &self,
        request: &ModelRequest,
        config_path: Option<&Path>,
        target_dir: &Path,
    ) -> Result<Vec<OsString>> {
        let mut names = list_local_files(&request.model_path)?;
        names.sort();
        let mut extra_files: Vec<String> = names
            .iter()
            .map(|name| request.model_path.join(name).display().to_string())
            .collect();
        if let Some(config) = config_path {
            extra_files.push(config.display().to_string());
        }

        let mut args: Vec<OsString> = vec![
            "--model-name".into(),
            request.model_name.clone().into(),
            "--version".into(),
            request.repo_version.clone().into(),
            "--handler".into(),
            request.handler_path.clone().into(),
        ];
        if !extra_files.is_empty() {
            args.push("--extra-files".into());
            args.push(extra_files.join(",").into());
        }
        args.push("--export-path".into());
        args.push(target_dir.as_os_str().to_owned());
        args.push("--force".into());
        Ok(args)
    }
}

fn log_output(label: &str, output: &[u8], verbose: bool) {
    for line in String::from_utf8_lossy(output).lines() {
        if verbose {
            info!("[{}] {}", label, line);
        } else {
            debug!("[{}] {}", label, line);
        }
    }
}

#[async_trait]
impl ArchiveGenerator for TorchModelArchiver {
    async fn generate(
        &self,
        request: &ModelRequest,
        config_path: Option<&Path>,
        target_dir: &Path,
        debug: bool,
    ) -> Result<()> {
        if request.handler_path.is_empty() {
            return Err(ModelpackError::ArchiveFailed {
                message: format!("no handler configured for {}", request.model_name),
            });
        }

        let args = self.build_args(request, config_path, target_dir)?;
        if debug {
            info!("Running {} {:?}", self.program.display(), args);
        } else {
            debug!("Running {} {:?}", self.program.display(), args);
        }

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| ModelpackError::ArchiveFailed {
                message: format!("failed to start {}: {}", self.program.display(), e),
            })?;

        log_output("stdout", &output.stdout, debug);
        log_output("stderr", &output.stderr, debug);

        if !output.status.success() {
            return Err(ModelpackError::ArchiveFailed {
                message: format!(
                    "{} exited with status: {}",
                    self.program.display(),
                    output.status.code().unwrap_or(-1)
                ),
            });
        }
        Ok(())
    }
}
