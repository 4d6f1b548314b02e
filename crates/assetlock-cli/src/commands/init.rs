//! `assetlock init` — Write a default configuration file.

use clap::Args;
use std::path::Path;

use crate::config::AssetLockConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "configuration file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    AssetLockConfig::default().save(config_path)?;
    tracing::info!(path = %config_path.display(), "wrote default config");
    println!("Initialized AssetLock configuration at {}", config_path.display());
    println!("Run 'assetlock demo' to exercise the lock/claim/reclaim flows.");

    Ok(())
}
