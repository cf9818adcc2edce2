//! CLI commands.

pub mod account;
pub mod edit;
pub mod fs;
pub mod init;
pub mod root;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use mfstage_core::{Config, MfsPath, Namespace, StageError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "mfstage.toml";

pub fn config_path(config: Option<&Path>) -> PathBuf {
    config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

/// Loads configuration from file (defaults when missing) plus environment.
pub fn load_config(config: Option<&Path>) -> Result<Config> {
    let path = config_path(config);
    tracing::debug!(path = %path.display(), "loading configuration");
    Config::load(&path)
        .and_then(Config::apply_env)
        .map_err(with_suggestion)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Connects and initializes the namespace.
pub async fn open(config: Option<&Path>) -> Result<Namespace> {
    let config = load_config(config)?;
    let kind = config.transport.kind;
    Namespace::connect(config)
        .await
        .map_err(with_suggestion)
        .with_context(|| format!("Failed to open namespace over the {} transport", kind))
}

pub fn parse_path(path: &str) -> Result<MfsPath> {
    MfsPath::parse(path).with_context(|| format!("Invalid namespace path '{}'", path))
}

/// Attaches the core's recovery hint to an error, if it has one.
pub fn with_suggestion(err: StageError) -> anyhow::Error {
    match err.recovery_suggestion() {
        Some(hint) => anyhow::Error::new(err).context(format!("hint: {}", hint)),
        None => anyhow::Error::new(err),
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
