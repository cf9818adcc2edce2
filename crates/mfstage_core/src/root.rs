//! Cached hash of the data root.

use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::path::MfsPath;
use crate::transport::Transport;
use std::sync::Arc;
use tokio::sync::{watch, OnceCell};
use tracing::{debug, info};

/// Tracks the content hash of the data root directory.
///
/// The cached value is advisory: [`refresh`](Self::refresh) re-stats the data
/// root and replaces it unconditionally, and is not serialized against
/// concurrent mutations. Each tracker is an ordinary value, so several
/// namespaces with their own roots can coexist in one process.
pub struct RootHashTracker {
    transport: Arc<dyn Transport>,
    data_root: MfsPath,
    init: OnceCell<()>,
    current: watch::Sender<Option<ContentHash>>,
}

impl RootHashTracker {
    pub fn new(transport: Arc<dyn Transport>, data_root: MfsPath) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            transport,
            data_root,
            init: OnceCell::new(),
            current,
        }
    }

    /// Probes the daemon, creates the data root if absent, and caches its hash.
    ///
    /// Only the first successful call does any work; later calls return
    /// immediately without probing again. A failed call leaves the tracker
    /// uninitialized so it can be retried.
    pub async fn initialize(&self) -> Result<()> {
        self.init
            .get_or_try_init(|| async {
                if !self.transport.health_probe().await {
                    return Err(StageError::DaemonUnavailable(format!(
                        "{} transport did not answer the health probe",
                        self.transport.kind()
                    )));
                }

                if self.transport.stat(&self.data_root).await?.is_none() {
                    debug!(data_root = %self.data_root, "creating data root");
                    self.transport.mkdir(&self.data_root, true).await?;
                }

                let hash = self.refresh().await?;
                info!(
                    data_root = %self.data_root,
                    root = ?hash,
                    transport = %self.transport.kind(),
                    "root hash tracker initialized"
                );
                Ok(())
            })
            .await
            .map(|_| ())
    }

    /// True once [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.init.initialized()
    }

    /// Re-stats the data root and replaces the cached hash.
    pub async fn refresh(&self) -> Result<Option<ContentHash>> {
        let hash = self.transport.stat(&self.data_root).await?;
        debug!(root = ?hash, "root hash refreshed");
        self.current.send_replace(hash.clone());
        Ok(hash)
    }

    /// The last cached hash, if any.
    pub fn current(&self) -> Option<ContentHash> {
        self.current.borrow().clone()
    }

    /// Receives every refreshed value, e.g. to publish it elsewhere.
    pub fn subscribe(&self) -> watch::Receiver<Option<ContentHash>> {
        self.current.subscribe()
    }

    /// The directory whose hash is tracked.
    pub fn data_root(&self) -> &MfsPath {
        &self.data_root
    }
}
