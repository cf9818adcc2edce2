//! mfstage Core Library
//!
//! Staged editing of a mutable namespace layered over a content-addressed
//! store, providing:
//! - Path-level reads and writes with an advisory, cached data root hash
//! - File and folder staging contexts that commit or abandon as a unit
//! - Interchangeable transports (HTTP API, CLI processes, in-process node)
//! - A per-account layout and a key-value view for documents
//!
//! # Quick Start
//!
//! ```
//! use mfstage_core::{Config, LocalTransport, MfsPath, Namespace};
//! use std::sync::Arc;
//! use tempfile::TempDir;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let tmp = TempDir::new().unwrap();
//! let transport = LocalTransport::open(tmp.path().join("node")).unwrap();
//! let ns = Namespace::with_transport(Config::default(), Arc::new(transport))
//!     .await
//!     .unwrap();
//!
//! let path = MfsPath::parse("/data/hello.txt").unwrap();
//! ns.fs().write_text(&path, "hello world", true).await.unwrap();
//! assert_eq!(ns.fs().read_text(&path).await.unwrap(), "hello world");
//!
//! // The cached root follows every mutation made with `update_root`.
//! assert_eq!(ns.root().current(), ns.fs().hash_of(ns.root().data_root()).await);
//! # });
//! ```
//!
//! # Staging
//!
//! A staging context hands out a local working copy of a namespace entry
//! and writes it back only when the work succeeds:
//!
//! ```
//! use mfstage_core::{Config, LocalTransport, MfsPath, Namespace, StageError};
//! use std::sync::Arc;
//! use tempfile::TempDir;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let tmp = TempDir::new().unwrap();
//! let mut config = Config::default();
//! config.staging.scratch_dir = tmp.path().join("scratch");
//! let transport = LocalTransport::open(tmp.path().join("node")).unwrap();
//! let ns = Namespace::with_transport(config, Arc::new(transport)).await.unwrap();
//!
//! let target = MfsPath::parse("/data/notes.txt").unwrap();
//! ns.with_file(Some(target.clone()), Some("txt"), |local| async move {
//!     tokio::fs::write(&local, "draft").await.map_err(StageError::Io)
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(ns.fs().read_text(&target).await.unwrap(), "draft");
//! # });
//! ```

mod accounts;
mod config;
mod error;
mod hash;
mod ingest;
mod kv;
mod local;
mod materialize;
mod mfs;
mod namespace;
mod path;
mod root;
mod staging;
pub mod transport;

pub use accounts::{AccountLayout, AUTH_EXT, COLLECTION_FILE, DATA_FILE, MEDIA_DIR};
pub use config::{Config, NamespaceConfig, StagingConfig, TransportConfig, TransportKind};
pub use error::{Result, StageError};
pub use hash::ContentHash;
pub use ingest::ContentIngestor;
pub use kv::KvStore;
pub use local::{LocalNode, ObjectId};
pub use mfs::{CopyOptions, MutableFs};
pub use namespace::Namespace;
pub use path::MfsPath;
pub use root::RootHashTracker;
pub use staging::{FileStaging, FolderStaging, SCRATCH_PREFIX};
pub use transport::{
    CommandTransport, HttpTransport, Link, LinkKind, LocalTransport, Transport,
};
