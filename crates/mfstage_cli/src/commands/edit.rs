//! Edit namespace entries through staging contexts.

use super::{open, parse_path};
use anyhow::{bail, Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Placeholder replaced by the local working copy's path.
const PLACEHOLDER: &str = "{}";

pub async fn file(
    config: Option<&Path>,
    path: &str,
    ext: Option<&str>,
    command: &[String],
) -> Result<()> {
    let target = parse_path(path)?;
    let ns = open(config).await?;

    let ((), hash) = ns
        .with_file(Some(target.clone()), ext, |local| run_editor(command, local))
        .await?;

    println!(
        "{} Committed {} ({})",
        style("✓").green(),
        style(&target).cyan(),
        hash
    );
    Ok(())
}

pub async fn folder(config: Option<&Path>, path: &str, command: &[String]) -> Result<()> {
    let target = parse_path(path)?;
    let ns = open(config).await?;

    let ((), hash) = ns
        .with_folder(Some(target.clone()), |local| run_editor(command, local))
        .await?;

    println!(
        "{} Committed {} ({})",
        style("✓").green(),
        style(&target).cyan(),
        hash
    );
    Ok(())
}

async fn run_editor(command: &[String], local: PathBuf) -> Result<()> {
    let argv = build_argv(command, &local);
    let (program, args) = argv
        .split_first()
        .context("No command given")?;

    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .with_context(|| format!("Failed to run '{}'", program))?;

    if !status.success() {
        bail!(
            "'{}' exited with {}; changes abandoned",
            program,
            status
        );
    }
    Ok(())
}

fn build_argv(command: &[String], local: &Path) -> Vec<String> {
    let local = local.display().to_string();
    let mut replaced = false;
    let mut argv: Vec<String> = command
        .iter()
        .map(|arg| {
            if arg.contains(PLACEHOLDER) {
                replaced = true;
                arg.replace(PLACEHOLDER, &local)
            } else {
                arg.clone()
            }
        })
        .collect();
    if !replaced {
        argv.push(local);
    }
    argv
}
