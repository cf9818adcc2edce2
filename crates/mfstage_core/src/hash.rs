//! Opaque content hashes handed out by the backing store.

use crate::error::{Result, StageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an immutable blob or directory in the backing store.
///
/// The value is whatever the store derives from the content: a CID when a
/// daemon is behind the transport, a BLAKE3 hex digest for the local node.
/// This layer never inspects it beyond validating that it can be embedded
/// in an immutable path.
///
/// # Examples
///
/// ```
/// use mfstage_core::ContentHash;
///
/// let hash: ContentHash = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".parse().unwrap();
/// assert_eq!(
///     hash.immutable_path(),
///     "/ipfs/QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
/// );
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Parses and validates a hash string.
    ///
    /// Surrounding whitespace is trimmed, since both the CLI and the RPC
    /// API terminate hashes with a newline.
    ///
    /// # Errors
    ///
    /// Returns `StageError::InvalidHash` if the value is empty or contains
    /// `/` or interior whitespace.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.contains('/') || s.chars().any(char::is_whitespace) {
            return Err(StageError::InvalidHash(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the hash as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `/ipfs/<hash>` path naming this content on the
    /// immutable read surface.
    pub fn immutable_path(&self) -> String {
        format!("/ipfs/{}", self.0)
    }
}

impl FromStr for ContentHash {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = StageError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.0.chars().take(12).collect();
        write!(f, "ContentHash({}...)", short)
    }
}
