//! The packaging request carried through one workflow run.

use std::path::PathBuf;

/// Everything a packaging run needs to know.
///
/// Built once from user input. The resolver fills in `repo_id` and
/// `repo_version`; `handler_path` is filled from the registry when empty.
#[derive(Clone, Default)]
pub struct ModelRequest {
    pub model_name: String,
    /// Hub repository, set by the resolver.
    pub repo_id: String,
    /// Requested revision; empty means the registry default.
    pub repo_version: String,
    /// Directory holding (or receiving) the model files.
    pub model_path: PathBuf,
    /// Directory receiving the final archive.
    pub archive_output_dir: PathBuf,
    /// Handler path; empty means the registry's handler.
    pub handler_path: String,
    pub access_token: Option<String>,
    /// Passed through to the archive generator.
    pub debug: bool,
    pub should_download: bool,
}

impl ModelRequest {
    pub fn new(
        model_name: impl Into<String>,
        model_path: impl Into<PathBuf>,
        archive_output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            model_path: model_path.into(),
            archive_output_dir: archive_output_dir.into(),
            should_download: true,
            ..Default::default()
        }
    }

    pub fn with_repo_version(mut self, repo_version: impl Into<String>) -> Self {
        self.repo_version = repo_version.into();
        self
    }

    pub fn with_handler_path(mut self, handler_path: impl Into<String>) -> Self {
        self.handler_path = handler_path.into();
        self
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub fn with_download(mut self, should_download: bool) -> Self {
        self.should_download = should_download;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl std::fmt::Debug for ModelRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRequest")
            .field("model_name", &self.model_name)
            .field("repo_id", &self.repo_id)
            .field("repo_version", &self.repo_version)
            .field("model_path", &self.model_path)
            .field("archive_output_dir", &self.archive_output_dir)
            .field("handler_path", &self.handler_path)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("debug", &self.debug)
            .field("should_download", &self.should_download)
            .finish()
    }
}
