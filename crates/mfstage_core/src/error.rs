//! Error types for mfstage_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mfstage_core operations.
#[derive(Error, Debug)]
pub enum StageError {
    /// A read was attempted on a logical path that resolves to nothing.
    #[error("path not found: {0}")]
    NotFound(String),

    /// A call to the backing store's control surface failed.
    #[error("transport failure during {op}: {message}")]
    Transport {
        /// Name of the control-surface operation (`files/write`, `add`, ...)
        op: &'static str,
        /// Message reported by the daemon, process, or client
        message: String,
    },

    /// The backing store did not answer the health probe.
    #[error("content daemon unavailable: {0}")]
    DaemonUnavailable(String),

    /// Creating, reading, or deleting a local staging artifact failed.
    #[error("local I/O failure at {}: {source}", path.display())]
    LocalIo {
        /// Local path that was being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Logical path failed to parse.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The rejected input
        path: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Content hash failed to parse.
    #[error("invalid content hash {0:?}")]
    InvalidHash(String),

    /// Invalid hex string for ObjectId parsing.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Content read in text mode was not valid UTF-8.
    #[error("content at {0} is not valid UTF-8")]
    InvalidUtf8(String),

    /// Object with the given ID was not found in the local object store.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// Hash verification failed during object read.
    #[error("hash mismatch: expected {expected}, got {actual}")]
    HashMismatch {
        /// The expected object ID
        expected: String,
        /// The actual computed hash
        actual: String,
    },

    /// The object file is corrupted or has invalid format.
    #[error("corrupted object at {}: {}", path.display(), reason)]
    CorruptedObject {
        /// Path to the corrupted object
        path: PathBuf,
        /// Description of the corruption
        reason: String,
    },

    /// Serialization error during typed object operations.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error during typed object operations.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Compression or decompression failed.
    #[error("compression error: {0}")]
    Compression(String),

    /// Blob exceeds maximum allowed size.
    #[error("blob too large: {size} bytes exceeds limit of {limit} bytes")]
    BlobTooLarge {
        /// Actual size of the blob
        size: usize,
        /// Maximum allowed size
        limit: usize,
    },

    /// Invalid root pointer file content.
    #[error("invalid ref at {}: {}", path.display(), reason)]
    InvalidRef {
        /// Path to the invalid ref file
        path: PathBuf,
        /// Description of what's invalid
        reason: String,
    },

    /// A namespace entry already exists where a new one was to be linked.
    #[error("path already exists: {0}")]
    AlreadyExists(String),

    /// A path component that should be a directory is a file.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A directory was used where a file was expected.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Non-recursive removal of a non-empty directory.
    #[error("directory not empty: {0} (use recursive removal)")]
    DirectoryNotEmpty(String),

    /// Staged artifact was never created by the caller.
    #[error("nothing staged at {}", .0.display())]
    NothingStaged(PathBuf),

    /// I/O error inside the local node.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StageError {
    /// Builds a transport failure for the named operation.
    pub(crate) fn transport(op: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            op,
            message: message.into(),
        }
    }

    /// Builds a local I/O failure for the given path.
    pub(crate) fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// True when the error means "nothing lives at that path".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::ObjectNotFound(_))
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DaemonUnavailable(_) => {
                Some("Start the content daemon (e.g. 'ipfs daemon') or switch to the local transport.")
            }
            Self::Transport { .. } => {
                Some("Check the daemon logs; nothing is retried automatically at this layer.")
            }
            Self::NotFound(_) => Some("Run 'mfstage stat <path>' to check what the path resolves to."),
            Self::CorruptedObject { .. } | Self::HashMismatch { .. } => {
                Some("The local node's object store is damaged; restore it from a backup.")
            }
            Self::InvalidRef { .. } => {
                Some("The local node's root pointer is unreadable; remove it to start from an empty root.")
            }
            Self::ConfigError(_) => Some("Check the [transport], [namespace] and [staging] sections."),
            _ => None,
        }
    }
}

/// Convenience Result type for mfstage_core operations.
pub type Result<T> = std::result::Result<T, StageError>;
