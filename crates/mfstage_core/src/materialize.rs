//! Copying immutable content out to the local filesystem.
//!
//! A read-only mount (`<mount>/<hash>`) is used when one is configured and
//! serves the hash; otherwise content is pulled through the transport.

use crate::error::{Result, StageError};
use crate::hash::ContentHash;
use crate::transport::{LinkKind, Transport};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Writes the file named by `hash` to `dest`.
pub(crate) async fn materialize_file(
    transport: &dyn Transport,
    mount: Option<&Path>,
    hash: &ContentHash,
    dest: &Path,
) -> Result<()> {
    if let Some(source) = mounted(mount, hash).await {
        debug!(source = %source.display(), dest = %dest.display(), "copying file from mount");
        let dest_buf = dest.to_path_buf();
        return blocking(move || {
            std::fs::copy(&source, &dest_buf)
                .map(|_| ())
                .map_err(|e| StageError::local_io(&dest_buf, e))
        })
        .await;
    }

    debug!(%hash, dest = %dest.display(), "fetching file through transport");
    let data = transport.cat(hash).await?;
    tokio::fs::write(dest, data)
        .await
        .map_err(|e| StageError::local_io(dest, e))
}

/// Recreates the directory tree named by `hash` at `dest`, which must not
/// exist yet.
pub(crate) async fn materialize_dir(
    transport: &dyn Transport,
    mount: Option<&Path>,
    hash: &ContentHash,
    dest: &Path,
) -> Result<()> {
    if let Some(source) = mounted(mount, hash).await {
        debug!(source = %source.display(), dest = %dest.display(), "copying tree from mount");
        let dest_buf = dest.to_path_buf();
        return blocking(move || copy_tree(&source, &dest_buf)).await;
    }

    debug!(%hash, dest = %dest.display(), "fetching tree through transport");
    let mut pending = vec![(hash.clone(), dest.to_path_buf())];
    while let Some((dir_hash, dir)) = pending.pop() {
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StageError::local_io(&dir, e))?;

        for link in transport.ls(&dir_hash).await? {
            check_entry_name(&link.name)?;
            let path = dir.join(&link.name);
            match link.kind {
                LinkKind::Directory => pending.push((link.hash, path)),
                LinkKind::File => {
                    let data = transport.cat(&link.hash).await?;
                    tokio::fs::write(&path, data)
                        .await
                        .map_err(|e| StageError::local_io(&path, e))?;
                }
            }
        }
    }
    Ok(())
}

/// A listed name must stay inside the directory being filled.
fn check_entry_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if single && !name.contains(&['/', '\\'][..]) {
        Ok(())
    } else {
        Err(StageError::InvalidPath {
            path: name.to_string(),
            reason: "directory entry is not a single path component",
        })
    }
}

async fn mounted(mount: Option<&Path>, hash: &ContentHash) -> Option<PathBuf> {
    let candidate = mount?.join(hash.as_str());
    match tokio::fs::try_exists(&candidate).await {
        Ok(true) => Some(candidate),
        _ => None,
    }
}

async fn blocking<F>(f: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StageError::local_io(PathBuf::new(), std::io::Error::other(e.to_string())))?
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
            StageError::local_io(path, std::io::Error::other(e.to_string()))
        })?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| StageError::local_io(&target, e))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| StageError::local_io(&target, e))?;
        }
    }
    Ok(())
}
