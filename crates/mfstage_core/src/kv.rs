//! Key-value view of the namespace for document storage.

use crate::error::{Result, StageError};
use crate::mfs::MutableFs;
use crate::path::MfsPath;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Loads and dumps whole documents keyed by logical path.
#[derive(Clone)]
pub struct KvStore {
    fs: MutableFs,
}

impl KvStore {
    pub fn new(fs: MutableFs) -> Self {
        Self { fs }
    }

    /// The document stored under `key`. Fails `NotFound` if absent.
    pub async fn load(&self, key: &MfsPath) -> Result<Vec<u8>> {
        self.fs.read_bytes(key).await
    }

    /// Stores `value` under `key`, creating missing parent directories.
    pub async fn dump(&self, key: &MfsPath, value: &[u8]) -> Result<()> {
        if let Some(parent) = key.parent() {
            if self.fs.hash_of(&parent).await.is_none() {
                self.fs.make_dirs(&parent, false).await;
            }
        }
        self.fs.write_bytes(key, value, true).await
    }

    pub async fn load_json<T: DeserializeOwned>(&self, key: &MfsPath) -> Result<T> {
        let bytes = self.load(key).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StageError::Deserialization(format!("{}: {}", key, e)))
    }

    pub async fn dump_json<T: Serialize>(&self, key: &MfsPath, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| StageError::Serialization(format!("{}: {}", key, e)))?;
        self.dump(key, &bytes).await
    }
}
