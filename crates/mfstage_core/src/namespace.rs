//! The top-level handle tying transport, root tracking, and layout together.

use crate::accounts::AccountLayout;
use crate::config::Config;
use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::kv::KvStore;
use crate::mfs::MutableFs;
use crate::path::MfsPath;
use crate::root::RootHashTracker;
use crate::staging::{FileStaging, FolderStaging};
use crate::transport::{self, Transport};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// A connected, initialized namespace.
///
/// Cheap to clone; clones share the transport and the root hash cache.
#[derive(Clone)]
pub struct Namespace {
    config: Arc<Config>,
    root: Arc<RootHashTracker>,
    fs: MutableFs,
    accounts: AccountLayout,
    kv: KvStore,
}

impl Namespace {
    /// Builds the configured transport and initializes the root tracker.
    pub async fn connect(config: Config) -> Result<Self> {
        let transport = transport::connect(&config.transport)?;
        Self::with_transport(config, transport).await
    }

    /// Builds a namespace around an existing transport.
    pub async fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let root = Arc::new(RootHashTracker::new(
            Arc::clone(&transport),
            config.namespace.data_root.clone(),
        ));
        root.initialize().await?;

        let accounts = AccountLayout::new(&config.namespace.data_root, &config.namespace.users_dir)?;
        let fs = MutableFs::new(transport, Arc::clone(&root));

        Ok(Self {
            kv: KvStore::new(fs.clone()),
            config: Arc::new(config),
            root,
            fs,
            accounts,
        })
    }

    pub fn fs(&self) -> &MutableFs {
        &self.fs
    }

    pub fn root(&self) -> &RootHashTracker {
        &self.root
    }

    pub fn accounts(&self) -> &AccountLayout {
        &self.accounts
    }

    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs `f` on a file staging context for `target`.
    ///
    /// The context commits when `f` returns `Ok` and is abandoned when it
    /// returns `Err`; the error from `f` is passed through unchanged. The
    /// local file is removed in every case.
    pub async fn with_file<F, Fut, T, E>(
        &self,
        target: Option<MfsPath>,
        ext: Option<&str>,
        f: F,
    ) -> std::result::Result<(T, ContentHash), E>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<StageError>,
    {
        let staging = FileStaging::acquire(self, target, ext).await?;
        match f(staging.path().to_path_buf()).await {
            Ok(value) => {
                let hash = staging.commit().await?;
                Ok((value, hash))
            }
            Err(e) => {
                staging.abandon().await;
                Err(e)
            }
        }
    }

    /// Runs `f` on a folder staging context for `target`, with the same
    /// commit-or-abandon rules as [`with_file`](Self::with_file).
    pub async fn with_folder<F, Fut, T, E>(
        &self,
        target: Option<MfsPath>,
        f: F,
    ) -> std::result::Result<(T, ContentHash), E>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<StageError>,
    {
        let staging = FolderStaging::acquire(self, target).await?;
        match f(staging.path().to_path_buf()).await {
            Ok(value) => {
                let hash = staging.commit().await?;
                Ok((value, hash))
            }
            Err(e) => {
                staging.abandon().await;
                Err(e)
            }
        }
    }
}
