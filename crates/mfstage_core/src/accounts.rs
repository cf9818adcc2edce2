//! Per-account layout of the namespace.
//!
//! Every account owns one directory under the users root, named by the
//! SHA-256 of the account identifier so identifiers never appear in paths:
//!
//! ```text
//! <data_root>/users/<sha256(id)>/
//! ├── data.json
//! ├── <sha256(id + secret)>.auth
//! ├── collection.anki2
//! └── collection.media/
//! ```

use crate::error::Result;
use crate::mfs::MutableFs;
use crate::path::MfsPath;
use sha2::{Digest, Sha256};

/// Name of the per-account data document.
pub const DATA_FILE: &str = "data.json";
/// Name of the per-account collection database.
pub const COLLECTION_FILE: &str = "collection.anki2";
/// Name of the per-account media directory.
pub const MEDIA_DIR: &str = "collection.media";
/// Extension of credential marker files.
pub const AUTH_EXT: &str = "auth";

/// Resolves account identifiers to their logical paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLayout {
    users_root: MfsPath,
}

impl AccountLayout {
    /// Layout rooted at `<data_root>/<users_dir>`.
    pub fn new(data_root: &MfsPath, users_dir: &str) -> Result<Self> {
        Ok(Self {
            users_root: data_root.join(users_dir)?,
        })
    }

    pub fn users_root(&self) -> &MfsPath {
        &self.users_root
    }

    /// Hex SHA-256 of the account identifier.
    pub fn account_hex(id: &str) -> String {
        sha256_hex(id.as_bytes())
    }

    /// Hex SHA-256 of the identifier followed by the secret.
    pub fn credential_hex(id: &str, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn user_dir(&self, id: &str) -> MfsPath {
        child(&self.users_root, &Self::account_hex(id))
    }

    pub fn data_file(&self, id: &str) -> MfsPath {
        child(&self.user_dir(id), DATA_FILE)
    }

    /// Marker whose presence proves the identifier/secret pair.
    pub fn auth_file(&self, id: &str, secret: &str) -> MfsPath {
        let name = format!("{}.{}", Self::credential_hex(id, secret), AUTH_EXT);
        child(&self.user_dir(id), &name)
    }

    pub fn collection_file(&self, id: &str) -> MfsPath {
        child(&self.user_dir(id), COLLECTION_FILE)
    }

    pub fn media_dir(&self, id: &str) -> MfsPath {
        child(&self.user_dir(id), MEDIA_DIR)
    }

    /// True when the account's directory resolves.
    pub async fn account_exists(&self, fs: &MutableFs, id: &str) -> bool {
        fs.hash_of(&self.user_dir(id)).await.is_some()
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn child(base: &MfsPath, name: &str) -> MfsPath {
    // Names here are hex digests or fixed constants, never empty.
    base.join(name).expect("non-empty path segment")
}
