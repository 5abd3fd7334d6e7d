pub mod diff;
pub mod init;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tether_core::{
    config,
    types::{ChangeBasis, EditStrategy},
    Config,
};

pub use tether_sync::diff::display_path;

/// Site selection shared by `sync` and `diff`. Flags override `.tether.yaml`.
#[derive(Args, Debug)]
pub struct SiteArgs {
    /// Site root containing `.tether.yaml` and the pages directory.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Change basis: full-scan | diff | structured.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ChangeBasis>,

    /// Edit strategy: lines | document. Defaults to the mode's pairing.
    #[arg(long, value_name = "STRATEGY")]
    pub edit: Option<EditStrategy>,

    /// Pages directory, relative to the root.
    #[arg(long, value_name = "DIR")]
    pub pages_dir: Option<PathBuf>,

    /// Page file extension (without the dot).
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,

    /// Base revision for diff mode.
    #[arg(long, value_name = "REV")]
    pub base: Option<String>,

    /// Head revision for diff mode.
    #[arg(long, value_name = "REV")]
    pub head: Option<String>,
}

impl SiteArgs {
    /// Load the site config and apply flag overrides.
    pub fn resolve(&self) -> Result<Config> {
        if !self.root.is_dir() {
            anyhow::bail!("site root '{}' is not a directory", self.root.display());
        }
        let mut config = config::load(&self.root)
            .with_context(|| format!("failed to load config for '{}'", self.root.display()))?;

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(edit) = self.edit {
            config.edit = Some(edit);
        }
        if let Some(pages_dir) = &self.pages_dir {
            config.pages_dir = pages_dir.clone();
        }
        if let Some(ext) = &self.ext {
            config.extension = ext.clone();
        }
        if let Some(base) = &self.base {
            config.base_rev = base.clone();
        }
        if let Some(head) = &self.head {
            config.head_rev = head.clone();
        }

        let config = config.validate().context("invalid command-line override")?;
        tracing::debug!(
            "mode={} edit={} pages_dir={} ext={}",
            config.mode,
            config.edit_strategy(),
            config.pages_dir.display(),
            config.extension
        );
        Ok(config)
    }
}
