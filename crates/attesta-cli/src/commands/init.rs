//! `attesta init`: Write a default configuration file.

use clap::Args;
use std::path::Path;

use crate::config::AttestaConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, path: &Path) -> anyhow::Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = AttestaConfig::default();
    config.save(path)?;
    tracing::info!(path = %path.display(), "wrote default config");

    println!("Wrote {}", path.display());
    println!("  Data dir:      {}", config.storage.data_dir.display());
    println!("  Issuance fee:  {}", config.platform.issuance_fee);
    println!("  Member fee:    {}", config.platform.member_fee);
    Ok(())
}
