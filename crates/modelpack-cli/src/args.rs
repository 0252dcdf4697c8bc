//! Command-line arguments.

use clap::Parser;
use modelpack_core::PackagingConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "modelpack")]
#[command(about = "Download a HuggingFace model and package it as a model archive")]
pub struct Args {
    /// Name of the model, as registered in the model config
    #[arg(long = "model_name")]
    pub model_name: String,

    /// Commit ID of the HuggingFace repository (defaults to the registered revision)
    #[arg(long = "repo_version", default_value = "")]
    pub repo_version: String,

    /// Do not download; package the files already in --model_path
    #[arg(long = "no_download")]
    pub no_download: bool,

    /// Absolute path to the model folder
    #[arg(long = "model_path")]
    pub model_path: PathBuf,

    /// Absolute path of the archive output folder
    #[arg(long = "mar_output")]
    pub mar_output: PathBuf,

    /// Absolute path of the handler (defaults to the registered handler)
    #[arg(long = "handler_path", default_value = "")]
    pub handler_path: String,

    /// HuggingFace Hub token, required for gated models such as Llama 2
    #[arg(long = "hf_token")]
    pub hf_token: Option<String>,

    /// Enable debug logging and verbose archiver output
    #[arg(long)]
    pub debug: bool,

    /// Path to the model config file
    #[arg(long = "model_config", env = PackagingConfig::REGISTRY_ENV_VAR)]
    pub model_config: Option<PathBuf>,
}

impl Args {
    /// The model config file to load.
    ///
    /// `--model_config` (or its env var) wins; otherwise the file next to the
    /// executable, falling back to the current directory.
    pub fn model_config_path(&self) -> PathBuf {
        if let Some(path) = &self.model_config {
            return path.clone();
        }

        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(PackagingConfig::REGISTRY_FILENAME)));
        match beside_exe {
            Some(path) if path.is_file() => path,
            _ => PathBuf::from(PackagingConfig::REGISTRY_FILENAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "modelpack",
            "--model_name",
            "gpt2-small",
            "--model_path",
            "/data/gpt2",
            "--mar_output",
            "/data/model-store",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.model_name, "gpt2-small");
        assert_eq!(args.repo_version, "");
        assert!(!args.no_download);
        assert_eq!(args.handler_path, "");
        assert!(args.hf_token.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "--repo_version",
            "abc123",
            "--no_download",
            "--handler_path",
            "/handlers/custom.py",
            "--hf_token",
            "hf_x",
            "--debug",
            "--model_config",
            "/etc/modelpack/model_config.json",
        ]);
        assert_eq!(args.repo_version, "abc123");
        assert!(args.no_download);
        assert_eq!(args.handler_path, "/handlers/custom.py");
        assert_eq!(args.hf_token.as_deref(), Some("hf_x"));
        assert!(args.debug);
        assert_eq!(
            args.model_config_path(),
            PathBuf::from("/etc/modelpack/model_config.json")
        );
    }

    #[test]
    fn test_required_arguments() {
        assert!(Args::try_parse_from(["modelpack", "--model_name", "gpt2-small"]).is_err());
    }

    #[test]
    fn test_explicit_config_path_is_not_checked() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.json");
        let path_str = path.display().to_string();
        let args = parse(&["--model_config", &path_str]);
        assert_eq!(args.model_config_path(), path);
    }
}
