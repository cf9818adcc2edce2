//! The `ROOT` file: which tree `/` currently is.

use super::object_id::ObjectId;
use crate::error::{Result, StageError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Single mutable pointer of a local node.
///
/// One line of hex, replaced through a sibling temp file and a rename so a
/// reader never sees a half-written id. Callers serialize writers.
pub struct Refs {
    file: PathBuf,
}

impl Refs {
    pub fn new(node_dir: impl AsRef<Path>) -> Self {
        Self {
            file: node_dir.as_ref().join("ROOT"),
        }
    }

    /// `None` until the first `write_root`.
    pub fn read_root(&self) -> Result<Option<ObjectId>> {
        let line = match fs::read_to_string(&self.file) {
            Ok(line) => line,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        ObjectId::from_hex(&line)
            .map(Some)
            .map_err(|e| StageError::InvalidRef {
                path: self.file.clone(),
                reason: e.to_string(),
            })
    }

    pub fn write_root(&self, id: ObjectId) -> Result<()> {
        let staged = self.file.with_extension("next");
        let mut out = fs::File::create(&staged)?;
        writeln!(out, "{}", id)?;
        out.sync_all()?;
        drop(out);
        fs::rename(&staged, &self.file)?;
        Ok(())
    }
}
