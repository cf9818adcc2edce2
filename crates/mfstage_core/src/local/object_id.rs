//! Identifiers of objects in the local node.

use super::envelope::{seal, ObjectKind};
use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 digest of an object's frame.
///
/// The local node hands these out as 64-character lowercase hex
/// [`ContentHash`]es.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    pub const HEX_LEN: usize = 64;

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Id of the object holding `payload` as `kind`.
    pub(crate) fn digest(kind: ObjectKind, payload: &[u8]) -> Self {
        Self(*blake3::hash(&seal(kind, payload)).as_bytes())
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Fan-out directory under `objects/`: the first byte in hex.
    pub fn shard(&self) -> String {
        format!("{:02x}", self.0[0])
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes)
            .map_err(|e| StageError::InvalidHex(format!("{:?}: {}", s, e)))?;
        Ok(Self(bytes))
    }

    /// Object behind a hash this node issued.
    ///
    /// Daemon CIDs are not hex digests and come back as unknown objects.
    pub fn from_content_hash(hash: &ContentHash) -> Result<Self> {
        Self::from_hex(hash.as_str()).map_err(|_| StageError::ObjectNotFound(hash.to_string()))
    }

    pub fn content_hash(&self) -> ContentHash {
        ContentHash::parse(&self.as_hex()).expect("hex digest is a valid content hash")
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.as_hex()[..12])
    }
}
