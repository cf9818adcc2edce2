//! Staging contexts: local working copies of namespace entries.
//!
//! A handle is acquired against an optional logical target. Its local
//! artifact starts as a copy of the target's current content (or absent for
//! files, empty for folders). Releasing the handle either commits (ingest,
//! link at the target, clean up) or abandons (clean up only). Both consume
//! the handle, so a released context cannot be used again.
//!
//! A handle dropped without either, including when the future holding it is
//! cancelled, removes its local artifact on the spot and leaves the
//! namespace untouched.

use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::materialize::{materialize_dir, materialize_file};
use crate::mfs::{CopyOptions, MutableFs};
use crate::namespace::Namespace;
use crate::path::MfsPath;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Prefix of every local staging artifact.
pub const SCRATCH_PREFIX: &str = "mfstage-";

/// A randomly named local artifact, removed when released or dropped.
struct Scratch {
    path: PathBuf,
    is_dir: bool,
    released: bool,
}

impl Scratch {
    async fn new(dir: &Path, ext: Option<&str>, is_dir: bool) -> Result<Self> {
        let mut name = format!("{}{}", SCRATCH_PREFIX, Uuid::new_v4());
        if let Some(ext) = ext.map(|e| e.trim_start_matches('.')).filter(|e| !e.is_empty()) {
            if ext.contains(&['/', '\\'][..]) {
                return Err(StageError::InvalidPath {
                    path: ext.to_string(),
                    reason: "extension must not contain a path separator",
                });
            }
            name.push('.');
            name.push_str(ext);
        }

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| StageError::local_io(dir, e))?;

        Ok(Self {
            path: dir.join(name),
            is_dir,
            released: false,
        })
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Removes the artifact. Failures are logged, never returned.
    async fn cleanup(mut self) {
        self.released = true;
        let result = if self.is_dir {
            tokio::fs::remove_dir_all(&self.path).await
        } else {
            tokio::fs::remove_file(&self.path).await
        };
        log_cleanup(&self.path, result);
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!(path = %self.path.display(), "staging handle dropped without commit or abandon");
        let result = if self.is_dir {
            std::fs::remove_dir_all(&self.path)
        } else {
            std::fs::remove_file(&self.path)
        };
        log_cleanup(&self.path, result);
    }
}

fn log_cleanup(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => debug!(path = %path.display(), "staging artifact removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove staging artifact"),
    }
}

/// Ingests the artifact and, when there is a target, replaces it.
async fn publish(
    fs: &MutableFs,
    scratch: &Scratch,
    target: Option<&MfsPath>,
) -> Result<ContentHash> {
    if !scratch.exists().await {
        return Err(StageError::NothingStaged(scratch.path.clone()));
    }

    let hash = fs.ingestor().ingest(&scratch.path, scratch.is_dir).await?;

    if let Some(target) = target {
        if let Some(parent) = target.parent() {
            if fs.hash_of(&parent).await.is_none() {
                fs.make_dirs(&parent, false).await;
            }
        }
        let options = CopyOptions::replace().recursive(scratch.is_dir);
        fs.copy_from_immutable(&hash, target, options).await?;
    }

    info!(target = ?target.map(MfsPath::as_str), %hash, "staging committed");
    Ok(hash)
}

/// A local working copy of one file.
pub struct FileStaging {
    fs: MutableFs,
    target: Option<MfsPath>,
    scratch: Scratch,
}

impl FileStaging {
    /// Creates a fresh local path, filled with the target's current content
    /// when the target resolves. An absent target leaves the local path
    /// nonexistent for the caller to create.
    pub async fn acquire(
        ns: &Namespace,
        target: Option<MfsPath>,
        ext: Option<&str>,
    ) -> Result<Self> {
        let staging = &ns.config().staging;
        let scratch = Scratch::new(&staging.scratch_dir, ext, false).await?;
        let handle = Self {
            fs: ns.fs().clone(),
            target,
            scratch,
        };

        if let Err(e) = handle.fill(staging.mount.as_deref()).await {
            debug!(target = ?handle.target, error = %e, "file staging acquire failed");
            handle.scratch.cleanup().await;
            return Err(e);
        }

        debug!(path = %handle.path().display(), target = ?handle.target, "file staging acquired");
        Ok(handle)
    }

    async fn fill(&self, mount: Option<&Path>) -> Result<()> {
        let Some(target) = &self.target else {
            return Ok(());
        };
        match self.fs.hash_of(target).await {
            Some(hash) => {
                materialize_file(self.fs.transport().as_ref(), mount, &hash, &self.scratch.path)
                    .await
            }
            None => Ok(()),
        }
    }

    /// The local working copy.
    pub fn path(&self) -> &Path {
        &self.scratch.path
    }

    /// The logical path this copy is committed to, if any.
    pub fn target(&self) -> Option<&MfsPath> {
        self.target.as_ref()
    }

    /// Ingests the working copy, links it at the target, and cleans up.
    ///
    /// Fails with `NothingStaged` if the local file does not exist. Cleanup
    /// runs whether or not the commit succeeds.
    pub async fn commit(self) -> Result<ContentHash> {
        let result = publish(&self.fs, &self.scratch, self.target.as_ref()).await;
        self.scratch.cleanup().await;
        result
    }

    /// Discards the working copy without touching the namespace.
    pub async fn abandon(self) {
        debug!(target = ?self.target, "file staging abandoned");
        self.scratch.cleanup().await;
    }
}

/// A local working copy of a directory tree.
pub struct FolderStaging {
    fs: MutableFs,
    target: Option<MfsPath>,
    scratch: Scratch,
}

impl FolderStaging {
    /// Creates a fresh local directory holding the target's tree, or an
    /// empty one when the target is absent.
    pub async fn acquire(ns: &Namespace, target: Option<MfsPath>) -> Result<Self> {
        let staging = &ns.config().staging;
        let scratch = Scratch::new(&staging.scratch_dir, None, true).await?;
        let handle = Self {
            fs: ns.fs().clone(),
            target,
            scratch,
        };

        if let Err(e) = handle.fill(staging.mount.as_deref()).await {
            debug!(target = ?handle.target, error = %e, "folder staging acquire failed");
            handle.scratch.cleanup().await;
            return Err(e);
        }

        debug!(path = %handle.path().display(), target = ?handle.target, "folder staging acquired");
        Ok(handle)
    }

    async fn fill(&self, mount: Option<&Path>) -> Result<()> {
        let existing = match &self.target {
            Some(target) => self.fs.hash_of(target).await,
            None => None,
        };
        match existing {
            Some(hash) => {
                materialize_dir(self.fs.transport().as_ref(), mount, &hash, &self.scratch.path)
                    .await
            }
            None => tokio::fs::create_dir_all(&self.scratch.path)
                .await
                .map_err(|e| StageError::local_io(&self.scratch.path, e)),
        }
    }

    /// The local working directory.
    pub fn path(&self) -> &Path {
        &self.scratch.path
    }

    /// The logical path this tree is committed to, if any.
    pub fn target(&self) -> Option<&MfsPath> {
        self.target.as_ref()
    }

    /// Re-ingests the whole tree, links it at the target, and cleans up.
    pub async fn commit(self) -> Result<ContentHash> {
        let result = publish(&self.fs, &self.scratch, self.target.as_ref()).await;
        self.scratch.cleanup().await;
        result
    }

    /// Discards the working tree without touching the namespace.
    pub async fn abandon(self) {
        debug!(target = ?self.target, "folder staging abandoned");
        self.scratch.cleanup().await;
    }
}
