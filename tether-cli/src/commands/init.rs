//! `tether init [--root DIR]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tether_core::config;

/// Write a default `.tether.yaml`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Site root to initialize.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let path = config::init_at(&self.root)
            .with_context(|| format!("failed to init '{}'", self.root.display()))?;

        println!("✓ Wrote {}", path.display());
        println!("  Edit it to change the pages directory, extension or mode.");
        Ok(())
    }
}
