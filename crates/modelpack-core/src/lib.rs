//! modelpack core - download HuggingFace models and package them as model archives.
//!
//! The workflow resolves a registered model name to a hub repository and
//! revision, optionally downloads a snapshot, verifies the local files
//! against the repository listing, and hands them to an archive generator.
//!
//! # Example
//!
//! ```rust,ignore
//! use modelpack_core::{HuggingFaceClient, ModelRegistry, ModelRequest, Packager, TorchModelArchiver};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> modelpack_core::Result<()> {
//!     let registry = ModelRegistry::load("model_config.json".as_ref())?;
//!     let packager = Packager::new(
//!         Arc::new(registry),
//!         Arc::new(HuggingFaceClient::new()?),
//!         Arc::new(TorchModelArchiver::new()),
//!     );
//!
//!     let request = ModelRequest::new("gpt2-small", "/data/gpt2", "/data/model-store");
//!     let archive = packager.run(request).await?;
//!     println!("{}", archive.path.display());
//!     Ok(())
//! }
//! ```

pub mod archiver;
pub mod config;
pub mod error;
pub mod hub;
pub mod reconcile;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod staging;
pub mod workflow;

pub use archiver::{ArchiveGenerator, TorchModelArchiver};
pub use config::{HubConfig, PackagingConfig};
pub use error::{ModelpackError, Result};
pub use hub::{resolve_token, CommitInfo, HubClient, HuggingFaceClient, TokenSource};
pub use reconcile::{ExtensionFilter, FileSetDiff, Reconciliation};
pub use registry::{ModelRegistry, RegistryEntry};
pub use request::ModelRequest;
pub use resolver::{ModelResolver, ResolvedModel};
pub use staging::StagingDir;
pub use workflow::{PackagedArchive, Packager, WorkflowStage};
