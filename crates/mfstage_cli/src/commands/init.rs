//! Initialize the namespace.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Connects, creates the data root if absent, and writes the config file
/// when it does not exist yet.
pub async fn run(config: Option<&Path>) -> Result<()> {
    let path = super::config_path(config);
    let ns = super::open(config).await?;

    if !path.exists() {
        ns.config()
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Configuration written to {}", path.display());
    }

    let cfg = ns.config();
    println!("{} Namespace ready", style("✓").green());
    println!();
    println!("  Transport:   {}", cfg.transport.kind);
    println!("  Data root:   {}", cfg.namespace.data_root);
    println!("  Users:       {}", ns.accounts().users_root());
    println!("  Scratch dir: {}", cfg.staging.scratch_dir.display());
    match &cfg.staging.mount {
        Some(mount) => println!("  Mount:       {}", mount.display()),
        None => println!("  Mount:       {}", style("(none, fetching through transport)").dim()),
    }
    println!();
    match ns.root().current() {
        Some(hash) => println!("Root hash: {}", style(hash).cyan()),
        None => println!("Root hash: {}", style("(unresolved)").yellow()),
    }

    Ok(())
}
