//! Configuration for the staging layer.

use crate::error::{Result, StageError};
use crate::path::MfsPath;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration, usually read from `mfstage.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// How the backing store is reached.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Layout of the mutable namespace.
    #[serde(default)]
    pub namespace: NamespaceConfig,

    /// Where staging contexts put their local artifacts.
    #[serde(default)]
    pub staging: StagingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| StageError::ConfigError(format!("failed to read config: {}", e)))?;
            Self::from_toml(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| StageError::ConfigError(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StageError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| StageError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Overrides values from `MFSTAGE_*` environment variables.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(kind) = var("MFSTAGE_TRANSPORT") {
            self.transport.kind = kind.parse()?;
        }
        if let Some(url) = var("MFSTAGE_API_URL") {
            self.transport.api_url = url;
        }
        if let Some(bin) = var("MFSTAGE_IPFS_BIN") {
            self.transport.binary = PathBuf::from(bin);
        }
        if let Some(root) = var("MFSTAGE_LOCAL_ROOT") {
            self.transport.local_root = PathBuf::from(root);
        }
        if let Some(root) = var("MFSTAGE_DATA_ROOT") {
            self.namespace.data_root = MfsPath::parse(&root)?;
        }
        if let Some(dir) = var("MFSTAGE_SCRATCH_DIR") {
            self.staging.scratch_dir = PathBuf::from(dir);
        }
        if let Some(mount) = var("MFSTAGE_MOUNT") {
            self.staging.mount = if mount.is_empty() {
                None
            } else {
                Some(PathBuf::from(mount))
            };
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.namespace.data_root.is_root() {
            return Err(StageError::ConfigError(
                "namespace.data_root must not be the namespace root".to_string(),
            ));
        }
        if self.namespace.users_dir.is_empty() || self.namespace.users_dir.contains('/') {
            return Err(StageError::ConfigError(
                "namespace.users_dir must be a single path component".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which adapter carries control-surface calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Persistent client against the daemon's RPC API.
    #[default]
    Api,
    /// One CLI process per call.
    Command,
    /// In-process node rooted in a local directory.
    Local,
}

impl std::str::FromStr for TransportKind {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" | "http" => Ok(Self::Api),
            "command" | "cli" => Ok(Self::Command),
            "local" => Ok(Self::Local),
            other => Err(StageError::ConfigError(format!(
                "unknown transport kind: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Api => "api",
            Self::Command => "command",
            Self::Local => "local",
        })
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Adapter selection (default: api).
    pub kind: TransportKind,

    /// Base URL of the daemon RPC API (default: http://127.0.0.1:5001).
    pub api_url: String,

    /// CLI binary used by the command adapter (default: `ipfs`).
    pub binary: PathBuf,

    /// Directory of the in-process node used by the local adapter.
    pub local_root: PathBuf,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Api,
            api_url: "http://127.0.0.1:5001".to_string(),
            binary: PathBuf::from("ipfs"),
            local_root: PathBuf::from(".mfstage"),
        }
    }
}

/// Namespace layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Top-level path holding all account subtrees (default: /data).
    pub data_root: MfsPath,

    /// Directory under the data root holding per-account subtrees
    /// (default: users).
    pub users_dir: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            data_root: MfsPath::parse("/data").expect("static path is valid"),
            users_dir: "users".to_string(),
        }
    }
}

/// Staging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StagingConfig {
    /// Scratch directory for staging artifacts (default: system temp dir).
    pub scratch_dir: PathBuf,

    /// Read-only mount serving content by hash (e.g. `/ipfs`). When unset
    /// or missing, content is materialized through the transport.
    pub mount: Option<PathBuf>,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
            mount: None,
        }
    }
}
