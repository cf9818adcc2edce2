//! Transport adapter over the in-process [`LocalNode`].

use super::{Link, Transport};
use crate::config::TransportKind;
use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::local::LocalNode;
use crate::path::MfsPath;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Runs every call against a [`LocalNode`] on tokio's blocking pool.
#[derive(Clone)]
pub struct LocalTransport {
    node: Arc<LocalNode>,
}

impl LocalTransport {
    /// Opens (or creates) a node in `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            node: Arc::new(LocalNode::open(root)?),
        })
    }

    /// The node behind this transport.
    pub fn node(&self) -> &LocalNode {
        &self.node
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&LocalNode) -> Result<T> + Send + 'static,
    {
        let node = Arc::clone(&self.node);
        debug!(op, "local call");
        tokio::task::spawn_blocking(move || f(&node))
            .await
            .map_err(|e| StageError::transport(op, format!("blocking task failed: {}", e)))?
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn stat(&self, path: &MfsPath) -> Result<Option<ContentHash>> {
        let path = path.clone();
        self.run("files/stat", move |node| node.stat(&path)).await
    }

    async fn read(&self, path: &MfsPath) -> Result<Vec<u8>> {
        let path = path.clone();
        self.run("files/read", move |node| node.read(&path)).await
    }

    async fn write(&self, path: &MfsPath, data: Vec<u8>, create: bool) -> Result<()> {
        let path = path.clone();
        self.run("files/write", move |node| node.write(&path, &data, create))
            .await
    }

    async fn mkdir(&self, path: &MfsPath, parents: bool) -> Result<()> {
        let path = path.clone();
        self.run("files/mkdir", move |node| node.mkdir(&path, parents))
            .await
    }

    async fn remove(&self, path: &MfsPath, recursive: bool) -> Result<()> {
        let path = path.clone();
        self.run("files/rm", move |node| node.remove(&path, recursive))
            .await
    }

    async fn copy(&self, src: &ContentHash, dst: &MfsPath) -> Result<()> {
        let (src, dst) = (src.clone(), dst.clone());
        self.run("files/cp", move |node| node.copy(&src, &dst)).await
    }

    async fn add(&self, local: &Path, recursive: bool) -> Result<ContentHash> {
        let local = local.to_path_buf();
        self.run("add", move |node| node.add(&local, recursive)).await
    }

    async fn cat(&self, hash: &ContentHash) -> Result<Vec<u8>> {
        let hash = hash.clone();
        self.run("cat", move |node| node.cat(&hash)).await
    }

    async fn ls(&self, hash: &ContentHash) -> Result<Vec<Link>> {
        let hash = hash.clone();
        self.run("ls", move |node| node.ls(&hash)).await
    }

    async fn health_probe(&self) -> bool {
        self.run("files/stat", |node| node.stat(&MfsPath::root()))
            .await
            .map(|root| root.is_some())
            .unwrap_or(false)
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Local
    }
}
