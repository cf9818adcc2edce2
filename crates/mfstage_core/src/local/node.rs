//! In-process content-addressed node with a mutable namespace.
//!
//! Layout:
//! ```text
//! {root}/
//! ├── objects/ab/abcdef...   # zstd blobs and trees
//! ├── ROOT                   # tree id of `/`
//! └── LOCK                   # held while ROOT is rewritten
//! ```

use super::envelope::ObjectKind;
use super::object_id::ObjectId;
use super::object_store::ObjectStore;
use super::refs::Refs;
use super::tree::{Tree, TreeEntry, TreeEntryKind};
use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::path::MfsPath;
use crate::transport::{Link, LinkKind};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// A namespace node backed by the local object store.
///
/// Content is immutable and never deleted; `/` is a pointer to a tree that
/// every mutation rewrites from the changed entry up to the root. Mutations
/// hold an exclusive file lock, so several processes may share one node.
pub struct LocalNode {
    root: PathBuf,
    objects: ObjectStore,
    refs: Refs,
}

impl LocalNode {
    /// Opens (or creates) a node in the given directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("objects"))?;

        let node = Self {
            objects: ObjectStore::new(root.join("objects")),
            refs: Refs::new(&root),
            root,
        };

        let _lock = node.lock()?;
        if node.refs.read_root()?.is_none() {
            let empty = node.objects.put_tree(&Tree::default())?;
            node.refs.write_root(empty)?;
        }

        Ok(node)
    }

    /// Directory this node lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a path to its content hash.
    pub fn stat(&self, path: &MfsPath) -> Result<Option<ContentHash>> {
        Ok(self.resolve(path)?.map(|(id, _)| id.content_hash()))
    }

    /// Reads a file.
    pub fn read(&self, path: &MfsPath) -> Result<Vec<u8>> {
        match self.resolve(path)? {
            None => Err(StageError::NotFound(path.to_string())),
            Some((_, TreeEntryKind::Tree)) => Err(StageError::IsADirectory(path.to_string())),
            Some((id, TreeEntryKind::Blob)) => self.objects.get_blob(id),
        }
    }

    /// Writes a file, replacing any previous content.
    pub fn write(&self, path: &MfsPath, data: &[u8], create: bool) -> Result<()> {
        let _lock = self.lock()?;

        match self.resolve(path)? {
            Some((_, TreeEntryKind::Tree)) => {
                return Err(StageError::IsADirectory(path.to_string()))
            }
            None if !create => return Err(StageError::NotFound(path.to_string())),
            _ => {}
        }

        let id = self.objects.put_blob(data)?;
        self.update_parent(path, |parent, name| {
            parent.upsert(TreeEntry {
                name: name.to_string(),
                kind: TreeEntryKind::Blob,
                id,
            });
            Ok(())
        })
    }

    /// Creates a directory.
    pub fn mkdir(&self, path: &MfsPath, parents: bool) -> Result<()> {
        let _lock = self.lock()?;

        if !parents {
            return self.mkdir_one(path);
        }

        let mut current = MfsPath::root();
        for component in path.components() {
            current = current.join(component)?;
            match self.resolve(&current)? {
                Some((_, TreeEntryKind::Tree)) => continue,
                Some((_, TreeEntryKind::Blob)) => {
                    return Err(StageError::NotADirectory(current.to_string()))
                }
                None => self.mkdir_one(&current)?,
            }
        }
        Ok(())
    }

    fn mkdir_one(&self, path: &MfsPath) -> Result<()> {
        if self.resolve(path)?.is_some() {
            return Err(StageError::AlreadyExists(path.to_string()));
        }
        let id = self.objects.put_tree(&Tree::default())?;
        self.update_parent(path, |parent, name| {
            parent.upsert(TreeEntry {
                name: name.to_string(),
                kind: TreeEntryKind::Tree,
                id,
            });
            Ok(())
        })
    }

    /// Unlinks a path.
    pub fn remove(&self, path: &MfsPath, recursive: bool) -> Result<()> {
        if path.is_root() {
            return Err(StageError::InvalidPath {
                path: path.to_string(),
                reason: "cannot remove the namespace root",
            });
        }

        let _lock = self.lock()?;

        match self.resolve(path)? {
            None => return Err(StageError::NotFound(path.to_string())),
            Some((id, TreeEntryKind::Tree)) if !recursive => {
                if !self.objects.get_tree(id)?.is_empty() {
                    return Err(StageError::DirectoryNotEmpty(path.to_string()));
                }
            }
            Some(_) => {}
        }

        self.update_parent(path, |parent, name| {
            parent.remove(name);
            Ok(())
        })
    }

    /// Links existing content at `dst`.
    pub fn copy(&self, src: &ContentHash, dst: &MfsPath) -> Result<()> {
        let id = ObjectId::from_content_hash(src)?;
        let kind = match self.objects.kind_of(id)? {
            ObjectKind::Blob => TreeEntryKind::Blob,
            ObjectKind::Tree => TreeEntryKind::Tree,
        };

        let _lock = self.lock()?;

        if dst.is_root() || self.resolve(dst)?.is_some() {
            return Err(StageError::AlreadyExists(dst.to_string()));
        }

        self.update_parent(dst, |parent, name| {
            parent.upsert(TreeEntry {
                name: name.to_string(),
                kind,
                id,
            });
            Ok(())
        })
    }

    /// Ingests a local file or directory tree.
    pub fn add(&self, local: &Path, recursive: bool) -> Result<ContentHash> {
        let meta = fs::metadata(local).map_err(|e| StageError::local_io(local, e))?;
        if meta.is_dir() {
            if !recursive {
                return Err(StageError::IsADirectory(local.display().to_string()));
            }
            return self.add_dir(local).map(|id| id.content_hash());
        }
        let data = fs::read(local).map_err(|e| StageError::local_io(local, e))?;
        Ok(self.objects.put_blob(&data)?.content_hash())
    }

    fn add_dir(&self, dir: &Path) -> Result<ObjectId> {
        let mut entries = Vec::new();
        let listing = fs::read_dir(dir).map_err(|e| StageError::local_io(dir, e))?;

        for entry in listing {
            let entry = entry.map_err(|e| StageError::local_io(dir, e))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let meta = fs::metadata(&path).map_err(|e| StageError::local_io(&path, e))?;

            let (kind, id) = if meta.is_dir() {
                (TreeEntryKind::Tree, self.add_dir(&path)?)
            } else {
                let data = fs::read(&path).map_err(|e| StageError::local_io(&path, e))?;
                (TreeEntryKind::Blob, self.objects.put_blob(&data)?)
            };
            entries.push(TreeEntry { name, kind, id });
        }

        self.objects.put_tree(&Tree::new(entries))
    }

    /// Reads immutable file content.
    pub fn cat(&self, hash: &ContentHash) -> Result<Vec<u8>> {
        self.objects.get_blob(ObjectId::from_content_hash(hash)?)
    }

    /// Lists an immutable directory.
    pub fn ls(&self, hash: &ContentHash) -> Result<Vec<Link>> {
        let tree = self.objects.get_tree(ObjectId::from_content_hash(hash)?)?;
        Ok(tree
            .entries
            .into_iter()
            .map(|entry| Link {
                name: entry.name,
                hash: entry.id.content_hash(),
                kind: match entry.kind {
                    TreeEntryKind::Blob => LinkKind::File,
                    TreeEntryKind::Tree => LinkKind::Directory,
                },
            })
            .collect())
    }

    /// Walks from `/` to `path`. A file in the middle of the path means
    /// the path does not exist.
    fn resolve(&self, path: &MfsPath) -> Result<Option<(ObjectId, TreeEntryKind)>> {
        let mut id = self.root_id()?;
        let mut kind = TreeEntryKind::Tree;

        for component in path.components() {
            if kind != TreeEntryKind::Tree {
                return Ok(None);
            }
            match self.objects.get_tree(id)?.get(component) {
                Some(entry) => {
                    id = entry.id;
                    kind = entry.kind;
                }
                None => return Ok(None),
            }
        }

        Ok(Some((id, kind)))
    }

    /// Applies `f` to the parent directory of `path`, then rewrites every
    /// ancestor tree and the root pointer.
    fn update_parent<F>(&self, path: &MfsPath, f: F) -> Result<()>
    where
        F: FnOnce(&mut Tree, &str) -> Result<()>,
    {
        let name = path.file_name().ok_or_else(|| StageError::InvalidPath {
            path: path.to_string(),
            reason: "the namespace root has no parent",
        })?;
        let parent_path = path.parent().unwrap_or_else(MfsPath::root);
        let names: Vec<&str> = parent_path.components().collect();

        // trees[i] is the directory reached after i components.
        let mut trees = vec![self.objects.get_tree(self.root_id()?)?];
        for (i, component) in names.iter().enumerate() {
            let entry = trees[i]
                .get(component)
                .cloned()
                .ok_or_else(|| StageError::NotFound(parent_path.to_string()))?;
            if entry.kind != TreeEntryKind::Tree {
                return Err(StageError::NotADirectory(parent_path.to_string()));
            }
            trees.push(self.objects.get_tree(entry.id)?);
        }

        let mut leaf = trees.pop().unwrap_or_default();
        f(&mut leaf, name)?;
        let mut id = self.objects.put_tree(&leaf)?;

        while let Some(mut tree) = trees.pop() {
            tree.upsert(TreeEntry {
                name: names[trees.len()].to_string(),
                kind: TreeEntryKind::Tree,
                id,
            });
            id = self.objects.put_tree(&tree)?;
        }

        self.refs.write_root(id)
    }

    fn root_id(&self) -> Result<ObjectId> {
        match self.refs.read_root()? {
            Some(id) => Ok(id),
            None => self.objects.put_tree(&Tree::default()),
        }
    }

    fn lock(&self) -> Result<NodeLock> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.root.join("LOCK"))?;
        file.lock_exclusive()?;
        Ok(NodeLock(file))
    }
}

/// Exclusive lock on the node, released on drop.
struct NodeLock(File);

impl Drop for NodeLock {
    fn drop(&mut self) {
        let _ = self.0.unlock();
    }
}
