//! modelpack - download a registered HuggingFace model and package it as a
//! model archive (`<model_name>_<revision>.mar`).

mod args;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use modelpack_core::{
    resolve_token, HuggingFaceClient, ModelRegistry, ModelRequest, ModelpackError, Packager,
    TorchModelArchiver,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ModelpackError>() {
                Some(err) => error!("Packaging failed ({}): {}", err.kind(), err),
                None => error!("{:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config_path = args.model_config_path();
    info!("Model config: {}", config_path.display());
    let registry = ModelRegistry::load(&config_path)?;

    let token = resolve_token(args.hf_token.as_deref(), dirs::home_dir().as_deref()).map(
        |(token, source)| {
            info!("HuggingFace token found from {}", source);
            token
        },
    );

    let request = ModelRequest::new(&args.model_name, &args.model_path, &args.mar_output)
        .with_repo_version(&args.repo_version)
        .with_handler_path(&args.handler_path)
        .with_access_token(token)
        .with_download(!args.no_download)
        .with_debug(args.debug);

    let hub = HuggingFaceClient::new().context("failed to set up the HuggingFace client")?;
    let packager = Packager::new(
        Arc::new(registry),
        Arc::new(hub),
        Arc::new(TorchModelArchiver::new()),
    );

    let archive = packager.run(request).await?;
    info!(
        "Archive for {} with version {} written to {}",
        archive.model_name,
        archive.repo_version,
        archive.path.display()
    );
    Ok(())
}
