//! Path-level operations on the mutable namespace.

use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::ingest::ContentIngestor;
use crate::path::MfsPath;
use crate::root::RootHashTracker;
use crate::transport::Transport;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Options for linking content into the namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Remove whatever lives at the destination first.
    pub overwrite: bool,
    /// The source is a directory tree.
    pub recursive: bool,
    /// Refresh the cached root hash afterwards.
    pub update_root: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            recursive: false,
            update_root: true,
        }
    }
}

impl CopyOptions {
    /// Replace the destination, refresh the root.
    pub fn replace() -> Self {
        Self {
            overwrite: true,
            ..Self::default()
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn update_root(mut self, update_root: bool) -> Self {
        self.update_root = update_root;
        self
    }
}

/// Reads, writes, and links content at logical paths.
///
/// Every mutating call takes an `update_root` flag. Passing `false` lets a
/// caller batch several mutations and call [`refresh_root`](Self::refresh_root)
/// once at the end.
#[derive(Clone)]
pub struct MutableFs {
    transport: Arc<dyn Transport>,
    root: Arc<RootHashTracker>,
    ingestor: ContentIngestor,
}

impl MutableFs {
    pub fn new(transport: Arc<dyn Transport>, root: Arc<RootHashTracker>) -> Self {
        Self {
            ingestor: ContentIngestor::new(Arc::clone(&transport)),
            transport,
            root,
        }
    }

    /// The hash of whatever lives at `path`, or `None`.
    ///
    /// Never fails: a transport error is logged and reported as absence.
    pub async fn hash_of(&self, path: &MfsPath) -> Option<ContentHash> {
        match self.transport.stat(path).await {
            Ok(hash) => hash,
            Err(e) => {
                debug!(%path, error = %e, "stat failed, treating as absent");
                None
            }
        }
    }

    /// Writes `data` at `path`, replacing any previous content.
    pub async fn write_bytes(&self, path: &MfsPath, data: &[u8], update_root: bool) -> Result<()> {
        self.transport.write(path, data.to_vec(), true).await?;
        debug!(%path, len = data.len(), "wrote");
        self.after_mutation(update_root).await
    }

    /// Writes UTF-8 text at `path`.
    pub async fn write_text(&self, path: &MfsPath, text: &str, update_root: bool) -> Result<()> {
        self.write_bytes(path, text.as_bytes(), update_root).await
    }

    /// Reads the file at `path`. Fails `NotFound` if nothing lives there.
    pub async fn read_bytes(&self, path: &MfsPath) -> Result<Vec<u8>> {
        if self.hash_of(path).await.is_none() {
            return Err(StageError::NotFound(path.to_string()));
        }
        self.transport.read(path).await
    }

    /// Reads the file at `path` as UTF-8 text.
    pub async fn read_text(&self, path: &MfsPath) -> Result<String> {
        let bytes = self.read_bytes(path).await?;
        String::from_utf8(bytes).map_err(|_| StageError::InvalidUtf8(path.to_string()))
    }

    /// Creates `path` and any missing ancestors.
    ///
    /// Best-effort: on failure the error is logged, `false` is returned and
    /// the root is left alone.
    pub async fn make_dirs(&self, path: &MfsPath, update_root: bool) -> bool {
        if let Err(e) = self.transport.mkdir(path, true).await {
            warn!(%path, error = %e, "mkdir failed");
            return false;
        }
        self.refresh_best_effort(update_root).await
    }

    /// Unlinks `path`; directories need `recursive`.
    ///
    /// Best-effort, like [`make_dirs`](Self::make_dirs).
    pub async fn remove(&self, path: &MfsPath, recursive: bool, update_root: bool) -> bool {
        if let Err(e) = self.transport.remove(path, recursive).await {
            warn!(%path, recursive, error = %e, "remove failed");
            return false;
        }
        self.refresh_best_effort(update_root).await
    }

    /// Links immutable content `src` at `dst`.
    ///
    /// With `overwrite` the destination is removed first. The remove and the
    /// link are two separate calls: a reader in between sees nothing at
    /// `dst`, and a failed link leaves it empty.
    pub async fn copy_from_immutable(
        &self,
        src: &ContentHash,
        dst: &MfsPath,
        options: CopyOptions,
    ) -> Result<()> {
        if options.overwrite && self.hash_of(dst).await.is_some() {
            self.remove(dst, options.recursive, false).await;
        }

        self.transport.copy(src, dst).await?;
        debug!(%src, %dst, "linked");
        self.after_mutation(options.update_root).await
    }

    /// Ingests a local file or tree and links it at `dst`.
    pub async fn import_local(
        &self,
        local: &Path,
        dst: &MfsPath,
        options: CopyOptions,
    ) -> Result<ContentHash> {
        let hash = self.ingestor.ingest(local, options.recursive).await?;
        self.copy_from_immutable(&hash, dst, options).await?;
        Ok(hash)
    }

    /// Re-stats the data root.
    pub async fn refresh_root(&self) -> Result<Option<ContentHash>> {
        self.root.refresh().await
    }

    /// The ingestor sharing this namespace's transport.
    pub fn ingestor(&self) -> &ContentIngestor {
        &self.ingestor
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    async fn after_mutation(&self, update_root: bool) -> Result<()> {
        if update_root {
            self.root.refresh().await?;
        }
        Ok(())
    }

    async fn refresh_best_effort(&self, update_root: bool) -> bool {
        match self.after_mutation(update_root).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "root refresh failed");
                false
            }
        }
    }
}
