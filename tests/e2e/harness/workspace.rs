use anyhow::{Context, Result};
use mfstage_core::{Config, LocalTransport, Namespace, TransportKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Isolated environment: a local node plus a scratch directory, both in a
/// temp dir that disappears with the workspace.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Create an empty workspace
    pub fn empty() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        fs::create_dir_all(dir.path().join("scratch"))
            .context("Failed to create scratch directory")?;
        Ok(Self { dir })
    }

    /// Get workspace path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding the local node
    pub fn node_dir(&self) -> PathBuf {
        self.path().join("node")
    }

    /// Directory staging contexts create their artifacts in
    pub fn scratch_dir(&self) -> PathBuf {
        self.path().join("scratch")
    }

    /// Configuration pointing at this workspace
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.transport.kind = TransportKind::Local;
        config.transport.local_root = self.node_dir();
        config.staging.scratch_dir = self.scratch_dir();
        config
    }

    /// Open a fresh transport over the workspace node
    pub fn open_transport(&self) -> Result<LocalTransport> {
        LocalTransport::open(self.node_dir()).context("Failed to open local node")
    }

    /// Connect a namespace over its own transport instance
    pub async fn open_namespace(&self) -> Result<Namespace> {
        let transport = self.open_transport()?;
        Namespace::with_transport(self.config(), Arc::new(transport))
            .await
            .context("Failed to initialize namespace")
    }

    /// Entries currently left in the scratch directory
    pub fn scratch_entries(&self) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.scratch_dir())? {
            entries.push(entry?.path());
        }
        Ok(entries)
    }
}

/// Location of a named fixture directory
pub fn fixture_path(name: &str) -> Result<PathBuf> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name);

    if !path.exists() {
        anyhow::bail!("Fixture not found: {}", path.display());
    }
    Ok(path)
}

/// Read one file out of a fixture
pub fn fixture_file(name: &str, file: &str) -> Result<Vec<u8>> {
    let path = fixture_path(name)?.join(file);
    fs::read(&path).with_context(|| format!("Failed to read fixture file: {}", path.display()))
}
