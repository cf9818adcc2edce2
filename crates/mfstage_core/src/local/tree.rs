//! Directory listings stored as typed objects.

use super::object_id::ObjectId;
use serde::{Deserialize, Serialize};

/// One directory of the local node.
///
/// Identical listings hash identically, so an unchanged directory keeps
/// its hash across rewrites.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    /// Sorted list of entries (MUST be sorted by name for determinism).
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Creates a new tree, automatically sorting entries by name.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { entries }
    }

    /// Looks up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Inserts or replaces an entry, keeping the listing sorted.
    pub fn upsert(&mut self, entry: TreeEntry) {
        match self
            .entries
            .binary_search_by(|e| e.name.as_str().cmp(&entry.name))
        {
            Ok(idx) => self.entries[idx] = entry,
            Err(idx) => self.entries.insert(idx, entry),
        }
    }

    /// Removes an entry by name, returning it.
    pub fn remove(&mut self, name: &str) -> Option<TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|idx| self.entries.remove(idx))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entry in a tree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Name of the entry (filename or directory name).
    pub name: String,
    /// Type of entry.
    pub kind: TreeEntryKind,
    /// ObjectId pointing to the content (blob or tree).
    pub id: ObjectId,
}

/// Type of tree entry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEntryKind {
    /// Regular file (blob).
    Blob,
    /// Directory (subtree).
    Tree,
}
