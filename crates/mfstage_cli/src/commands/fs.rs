//! Path-level namespace commands.

use super::{open, parse_path, with_suggestion};
use anyhow::{bail, Context, Result};
use console::style;
use mfstage_core::{ContentHash, CopyOptions};
use std::io::{Read, Write};
use std::path::Path;

pub async fn stat(config: Option<&Path>, path: &str) -> Result<()> {
    let path = parse_path(path)?;
    let ns = open(config).await?;

    match ns.fs().hash_of(&path).await {
        Some(hash) => {
            println!("{}", hash);
            Ok(())
        }
        None => bail!("{} does not exist", path),
    }
}

pub async fn cat(config: Option<&Path>, path: &str) -> Result<()> {
    let path = parse_path(path)?;
    let ns = open(config).await?;

    let data = ns.fs().read_bytes(&path).await.map_err(with_suggestion)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}

pub async fn write(config: Option<&Path>, path: &str, file: Option<&Path>) -> Result<()> {
    let path = parse_path(path)?;

    let data = match file {
        Some(file) => tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let ns = open(config).await?;
    ns.fs()
        .write_bytes(&path, &data, true)
        .await
        .map_err(with_suggestion)
        .with_context(|| format!("Failed to write {}", path))?;

    println!(
        "{} Wrote {} bytes to {}",
        style("✓").green(),
        data.len(),
        style(&path).cyan()
    );
    Ok(())
}

pub async fn mkdir(config: Option<&Path>, path: &str) -> Result<()> {
    let path = parse_path(path)?;
    let ns = open(config).await?;

    if !ns.fs().make_dirs(&path, true).await {
        bail!("Failed to create {} (run with RUST_LOG=warn for details)", path);
    }
    println!("{} Created {}", style("✓").green(), style(&path).cyan());
    Ok(())
}

pub async fn rm(config: Option<&Path>, path: &str, recursive: bool) -> Result<()> {
    let path = parse_path(path)?;
    let ns = open(config).await?;

    if !ns.fs().remove(&path, recursive, true).await {
        bail!("Failed to remove {}", path);
    }
    println!("{} Removed {}", style("✓").green(), style(&path).cyan());
    Ok(())
}

pub async fn cp(
    config: Option<&Path>,
    hash: &str,
    path: &str,
    force: bool,
    recursive: bool,
) -> Result<()> {
    let hash = ContentHash::parse(hash).context("Invalid content hash")?;
    let path = parse_path(path)?;
    let ns = open(config).await?;

    let options = CopyOptions {
        overwrite: force,
        recursive,
        update_root: true,
    };
    ns.fs()
        .copy_from_immutable(&hash, &path, options)
        .await
        .map_err(with_suggestion)
        .with_context(|| format!("Failed to link {} at {}", hash, path))?;

    println!(
        "{} Linked {} at {}",
        style("✓").green(),
        hash,
        style(&path).cyan()
    );
    Ok(())
}

pub async fn import(
    config: Option<&Path>,
    local: &Path,
    path: &str,
    recursive: bool,
    force: bool,
) -> Result<()> {
    let path = parse_path(path)?;
    let ns = open(config).await?;

    let pb = super::spinner(&format!("Importing {}", local.display()));
    let options = CopyOptions {
        overwrite: force,
        recursive,
        update_root: true,
    };
    let result = ns.fs().import_local(local, &path, options).await;
    pb.finish_and_clear();

    let hash = result
        .map_err(with_suggestion)
        .with_context(|| format!("Failed to import {}", local.display()))?;

    println!(
        "{} Imported {} as {}",
        style("✓").green(),
        local.display(),
        style(&path).cyan()
    );
    println!("  Hash: {}", hash);
    Ok(())
}
