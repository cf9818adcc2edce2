//! Show the data root hash.

use anyhow::{bail, Result};
use std::path::Path;

pub async fn run(config: Option<&Path>) -> Result<()> {
    let ns = super::open(config).await?;
    match ns.root().current() {
        Some(hash) => {
            println!("{}", hash);
            Ok(())
        }
        None => bail!("Data root {} does not resolve", ns.root().data_root()),
    }
}
