//! Immutable object files of the local node.

use super::envelope::{self, ObjectKind};
use super::object_id::ObjectId;
use super::tree::Tree;
use crate::error::{Result, StageError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest blob `put_blob` accepts (512 MB).
const MAX_BLOB_SIZE: usize = 512 * 1024 * 1024;

const ZSTD_LEVEL: i32 = 3;

/// Directory of zstd-compressed frames at `{root}/{shard}/{id}`.
///
/// Objects are written once and never removed, so any hash the node has
/// handed out stays readable.
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn put_blob(&self, data: &[u8]) -> Result<ObjectId> {
        if data.len() > MAX_BLOB_SIZE {
            return Err(StageError::BlobTooLarge {
                size: data.len(),
                limit: MAX_BLOB_SIZE,
            });
        }
        self.put(ObjectKind::Blob, data)
    }

    /// # Errors
    ///
    /// `IsADirectory` when `id` names a tree.
    pub fn get_blob(&self, id: ObjectId) -> Result<Vec<u8>> {
        match self.get(id)? {
            (ObjectKind::Blob, data) => Ok(data),
            (ObjectKind::Tree, _) => Err(StageError::IsADirectory(id.as_hex())),
        }
    }

    pub fn put_tree(&self, tree: &Tree) -> Result<ObjectId> {
        let encoded =
            postcard::to_allocvec(tree).map_err(|e| StageError::Serialization(e.to_string()))?;
        self.put(ObjectKind::Tree, &encoded)
    }

    /// # Errors
    ///
    /// `NotADirectory` when `id` names a blob.
    pub fn get_tree(&self, id: ObjectId) -> Result<Tree> {
        match self.get(id)? {
            (ObjectKind::Tree, encoded) => postcard::from_bytes(&encoded)
                .map_err(|e| StageError::Deserialization(e.to_string())),
            (ObjectKind::Blob, _) => Err(StageError::NotADirectory(id.as_hex())),
        }
    }

    pub(crate) fn kind_of(&self, id: ObjectId) -> Result<ObjectKind> {
        Ok(self.get(id)?.0)
    }

    pub fn exists(&self, id: ObjectId) -> bool {
        self.path_of(id).is_file()
    }

    fn path_of(&self, id: ObjectId) -> PathBuf {
        self.root.join(id.shard()).join(id.as_hex())
    }

    fn put(&self, kind: ObjectKind, payload: &[u8]) -> Result<ObjectId> {
        let id = ObjectId::digest(kind, payload);
        if self.exists(id) {
            return Ok(id);
        }

        let compressed = zstd::encode_all(envelope::seal(kind, payload).as_slice(), ZSTD_LEVEL)
            .map_err(|e| StageError::Compression(e.to_string()))?;

        let shard = self.root.join(id.shard());
        fs::create_dir_all(&shard)?;

        // Concurrent writers of one object each get their own temp file.
        let tmp = shard.join(format!(".{}-{}", id.as_hex(), uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&compressed)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, self.path_of(id))?;

        Ok(id)
    }

    fn get(&self, id: ObjectId) -> Result<(ObjectKind, Vec<u8>)> {
        let path = self.path_of(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StageError::ObjectNotFound(id.as_hex()))
            }
            Err(e) => return Err(e.into()),
        };
        let frame = zstd::decode_all(compressed.as_slice())
            .map_err(|e| StageError::Compression(e.to_string()))?;

        let (kind, payload) = envelope::open(&frame).map_err(|e| StageError::CorruptedObject {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let actual = ObjectId::digest(kind, payload);
        if actual != id {
            return Err(StageError::HashMismatch {
                expected: id.as_hex(),
                actual: actual.as_hex(),
            });
        }

        Ok((kind, payload.to_vec()))
    }
}
