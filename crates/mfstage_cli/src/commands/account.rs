//! Show an account's namespace layout.

use anyhow::Result;
use console::style;
use mfstage_core::AccountLayout;
use std::path::Path;

pub async fn run(config: Option<&Path>, id: &str, secret: Option<&str>) -> Result<()> {
    let ns = super::open(config).await?;
    let layout = ns.accounts();

    let exists = layout.account_exists(ns.fs(), id).await;
    println!("Account:    {}", style(id).bold());
    println!("Hash:       {}", AccountLayout::account_hex(id));
    println!(
        "Status:     {}",
        if exists {
            style("present").green()
        } else {
            style("absent").yellow()
        }
    );
    println!();
    println!("  Directory:  {}", layout.user_dir(id));
    println!("  Data:       {}", layout.data_file(id));
    println!("  Collection: {}", layout.collection_file(id));
    println!("  Media:      {}", layout.media_dir(id));

    if let Some(secret) = secret {
        let auth = layout.auth_file(id, secret);
        let present = ns.fs().hash_of(&auth).await.is_some();
        println!(
            "  Auth:       {} ({})",
            auth,
            if present { "present" } else { "absent" }
        );
    }

    Ok(())
}
