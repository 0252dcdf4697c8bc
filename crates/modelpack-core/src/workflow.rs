//! The packaging workflow.
//!
//! One run moves a [`ModelRequest`] through
//! `Start -> PathsValidated -> Resolved -> [Downloaded] -> Reconciled -> Packaged -> Done`
//! and stops at the first failure. Failures are returned, never turned into
//! process exits here.

use crate::archiver::ArchiveGenerator;
use crate::error::{IoResultExt, ModelpackError, Result};
use crate::hub::HubClient;
use crate::reconcile::{reconcile_model_files, ExtensionFilter};
use crate::registry::ModelRegistry;
use crate::request::ModelRequest;
use crate::resolver::ModelResolver;
use crate::staging::{self, final_archive_path};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Progress of a packaging run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Start,
    PathsValidated,
    Resolved,
    Downloaded,
    Reconciled,
    Packaged,
    Done,
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStage::Start => "start",
            WorkflowStage::PathsValidated => "paths_validated",
            WorkflowStage::Resolved => "resolved",
            WorkflowStage::Downloaded => "downloaded",
            WorkflowStage::Reconciled => "reconciled",
            WorkflowStage::Packaged => "packaged",
            WorkflowStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// A finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArchive {
    pub model_name: String,
    pub repo_id: String,
    pub repo_version: String,
    pub path: PathBuf,
}

/// Sequences resolution, download, reconciliation and packaging.
pub struct Packager {
    registry: Arc<ModelRegistry>,
    hub: Arc<dyn HubClient>,
    archiver: Arc<dyn ArchiveGenerator>,
    ignore: ExtensionFilter,
}

impl Packager {
    pub fn new(
        registry: Arc<ModelRegistry>,
        hub: Arc<dyn HubClient>,
        archiver: Arc<dyn ArchiveGenerator>,
    ) -> Self {
        Self {
            registry,
            hub,
            archiver,
            ignore: ExtensionFilter::default(),
        }
    }

    /// Replace the default ignored extensions.
    pub fn with_ignore(mut self, ignore: ExtensionFilter) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Run the whole workflow for one request.
    pub async fn run(&self, request: ModelRequest) -> Result<PackagedArchive> {
        let mut stage = WorkflowStage::Start;
        let result = self.run_stages(request, &mut stage).await;
        if let Err(ref e) = result {
            debug!("Packaging aborted after stage {}: {}", stage, e);
        }
        result
    }

    async fn run_stages(
        &self,
        mut request: ModelRequest,
        stage: &mut WorkflowStage,
    ) -> Result<PackagedArchive> {
        check_dir_exists("model_path", &request.model_path)?;
        check_dir_exists("mar_output", &request.archive_output_dir)?;
        self.advance(stage, WorkflowStage::PathsValidated);

        self.check_archive_absent(&request)?;

        ModelResolver::new(&self.registry, self.hub.as_ref())
            .resolve_request(&mut request)
            .await?;
        self.advance(stage, WorkflowStage::Resolved);

        if request.should_download {
            self.download(&request).await?;
            self.advance(stage, WorkflowStage::Downloaded);
        }

        let outcome = reconcile_model_files(
            self.hub.as_ref(),
            &request.model_path,
            &request.repo_id,
            &request.repo_version,
            request.token(),
            &self.ignore,
        )
        .await?;
        if !outcome.matches {
            return Err(ModelpackError::Reconciliation {
                repo_id: request.repo_id.clone(),
                revision: request.repo_version.clone(),
                diff: outcome.diff,
            });
        }
        self.advance(stage, WorkflowStage::Reconciled);

        let path = self.package(&mut request).await?;
        self.advance(stage, WorkflowStage::Packaged);

        info!(
            "Archive for {} with version {} is generated",
            request.model_name, request.repo_version
        );
        self.advance(stage, WorkflowStage::Done);

        Ok(PackagedArchive {
            model_name: request.model_name,
            repo_id: request.repo_id,
            repo_version: request.repo_version,
            path,
        })
    }

    fn advance(&self, stage: &mut WorkflowStage, next: WorkflowStage) {
        debug!("Workflow stage {} -> {}", stage, next);
        *stage = next;
    }

    /// Refuse to run when the versioned archive is already in the output directory.
    ///
    /// Uses the registry default when no revision was requested. Unknown model
    /// names are left for the resolver to report.
    fn check_archive_absent(&self, request: &ModelRequest) -> Result<()> {
        let revision = if request.repo_version.is_empty() {
            match self.registry.get(&request.model_name) {
                Some(entry) => entry.default_repo_version.clone(),
                None => return Ok(()),
            }
        } else {
            request.repo_version.clone()
        };

        let existing = final_archive_path(
            &request.archive_output_dir,
            &request.model_name,
            &revision,
        );
        if existing.exists() {
            return Err(ModelpackError::precondition(format!(
                "MAR file of model {} and version {} is already present: {}",
                request.model_name,
                revision,
                existing.display()
            )));
        }
        Ok(())
    }

    async fn download(&self, request: &ModelRequest) -> Result<()> {
        if !is_dir_empty(&request.model_path)? {
            return Err(ModelpackError::precondition(format!(
                "Make sure the path provided to download model files is empty: {}",
                request.model_path.display()
            )));
        }

        info!(
            "Starting model files download from {} with version {}",
            request.repo_id, request.repo_version
        );
        let written = self
            .hub
            .snapshot_download(
                &request.repo_id,
                &request.repo_version,
                &request.model_path,
                request.token(),
                &self.ignore,
            )
            .await?;
        info!("Successfully downloaded {} model file(s)", written.len());
        Ok(())
    }

    async fn package(&self, request: &mut ModelRequest) -> Result<PathBuf> {
        if request.handler_path.is_empty() {
            if let Some(handler) = self.registry.handler_path(&request.model_name) {
                request.handler_path = handler.display().to_string();
            }
        }

        let staging = staging::begin(
            &request.archive_output_dir,
            &request.model_name,
            &request.repo_version,
        )?;

        let debug = request.debug;
        self.archiver
            .generate(&*request, self.registry.source(), staging.path(), debug)
            .await?;

        staging::finalize(
            staging,
            &request.archive_output_dir,
            &request.model_name,
            &request.repo_version,
        )
    }
}

fn check_dir_exists(argument: &str, path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ModelpackError::Path {
            argument: argument.to_string(),
            path: path.to_path_buf(),
        })
    }
}

fn is_dir_empty(path: &Path) -> Result<bool> {
    Ok(std::fs::read_dir(path).with_path(path)?.next().is_none())
}
