//! Turning local artifacts into content hashes.

use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::transport::Transport;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Ingests local files and directory trees into the backing store.
///
/// Holds nothing but the transport, so clones are cheap and concurrent
/// ingestion of distinct paths needs no coordination.
#[derive(Clone)]
pub struct ContentIngestor {
    transport: Arc<dyn Transport>,
}

impl ContentIngestor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Ingests `local` and returns the hash of its content.
    ///
    /// A directory is only accepted when `recursive` is set; the returned
    /// hash then names the whole tree.
    pub async fn ingest(&self, local: &Path, recursive: bool) -> Result<ContentHash> {
        let meta = tokio::fs::metadata(local)
            .await
            .map_err(|e| StageError::local_io(local, e))?;

        if meta.is_dir() && !recursive {
            return Err(StageError::IsADirectory(local.display().to_string()));
        }

        let hash = self.transport.add(local, recursive).await?;
        debug!(local = %local.display(), %hash, recursive, "ingested");
        Ok(hash)
    }
}
