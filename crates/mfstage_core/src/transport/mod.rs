//! Control-surface calls to the backing content store.
//!
//! Every adapter satisfies the same contract, and callers hold an
//! `Arc<dyn Transport>` so they never depend on which one was configured:
//!
//! - [`HttpTransport`]: persistent client against the daemon RPC API
//! - [`CommandTransport`]: one CLI process per call
//! - [`LocalTransport`]: in-process node rooted in a local directory
//!
//! All methods are async and keep blocking work off the caller's task:
//! the HTTP client is natively non-blocking, child processes are awaited
//! through `tokio::process`, and the local node runs on the blocking pool.

mod command;
mod http;
mod local;

pub use command::CommandTransport;
pub use http::HttpTransport;
pub use local::LocalTransport;

use crate::config::{TransportConfig, TransportKind};
use crate::error::Result;
use crate::hash::ContentHash;
use crate::path::MfsPath;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Kind of an entry in an immutable directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    File,
    Directory,
}

/// One entry of an immutable directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Entry name within the directory.
    pub name: String,
    /// Hash of the entry's content.
    pub hash: ContentHash,
    /// File or directory.
    pub kind: LinkKind,
}

/// The backing store's control surface.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolves a logical path. Absence is `Ok(None)`, not an error.
    async fn stat(&self, path: &MfsPath) -> Result<Option<ContentHash>>;

    /// Reads a file. Fails `NotFound` if nothing lives at `path`.
    async fn read(&self, path: &MfsPath) -> Result<Vec<u8>>;

    /// Writes a file, replacing its previous content entirely.
    ///
    /// When `create` is false the file must already exist.
    async fn write(&self, path: &MfsPath, data: Vec<u8>, create: bool) -> Result<()>;

    /// Creates a directory. With `parents`, missing ancestors are created
    /// and an existing directory is not an error.
    async fn mkdir(&self, path: &MfsPath, parents: bool) -> Result<()>;

    /// Unlinks a path. Directories require `recursive`.
    async fn remove(&self, path: &MfsPath, recursive: bool) -> Result<()>;

    /// Links immutable content at `dst`, which must not exist yet.
    async fn copy(&self, src: &ContentHash, dst: &MfsPath) -> Result<()>;

    /// Ingests a local file, or a directory tree when `recursive`.
    async fn add(&self, local: &Path, recursive: bool) -> Result<ContentHash>;

    /// Reads immutable file content by hash.
    async fn cat(&self, hash: &ContentHash) -> Result<Vec<u8>>;

    /// Lists an immutable directory by hash.
    async fn ls(&self, hash: &ContentHash) -> Result<Vec<Link>>;

    /// True when the backing store answers.
    async fn health_probe(&self) -> bool;

    /// Which adapter this is, for logging.
    fn kind(&self) -> TransportKind;
}

/// Builds the adapter selected by configuration.
pub fn connect(config: &TransportConfig) -> Result<Arc<dyn Transport>> {
    let transport: Arc<dyn Transport> = match config.kind {
        TransportKind::Api => Arc::new(HttpTransport::new(&config.api_url)?),
        TransportKind::Command => Arc::new(CommandTransport::new(&config.binary)),
        TransportKind::Local => Arc::new(LocalTransport::open(&config.local_root)?),
    };
    tracing::debug!(kind = %config.kind, "transport configured");
    Ok(transport)
}

/// True when a daemon error message means the path does not exist.
pub(crate) fn is_missing_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("does not exist") || lower.contains("no such file") || lower.contains("not found")
}
