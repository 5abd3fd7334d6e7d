//! `tether diff`: show what sync would change.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tether_sync::{preview, Preview};

use super::{display_path, SiteArgs};

/// Arguments for `tether diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub site: SiteArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let config = self.site.resolve()?;
        let root = &self.site.root;

        let previews = preview(root, &config)
            .with_context(|| format!("diff failed for '{}'", root.display()))?;

        if previews.is_empty() {
            println!("No differences under '{}'.", config.pages_dir.display());
            return Ok(());
        }

        for item in previews {
            match item {
                Preview::Rename { from, to } => println!(
                    "{} {} → {}",
                    "rename".green(),
                    display_path(root, &from).display(),
                    display_path(root, &to).display()
                ),
                Preview::Conflict { path, target } => println!(
                    "{} {}: {} already exists",
                    "conflict".yellow(),
                    display_path(root, &path).display(),
                    display_path(root, &target).display()
                ),
                Preview::Edit { unified_diff, .. } => {
                    print!("{unified_diff}");
                    if !unified_diff.ends_with('\n') {
                        println!();
                    }
                }
            }
        }

        Ok(())
    }
}
