//! `tether sync`: reconcile every candidate page.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use tether_sync::{pipeline, Action, Summary, SyncReport};

use super::{display_path, SiteArgs};

/// Arguments for `tether sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Report what would change without renaming or writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SyncJson<'a> {
    #[serde(flatten)]
    report: &'a SyncReport,
    summary: Summary,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "renamed")]
    renamed: usize,
    #[tabled(rename = "updated")]
    updated: usize,
    #[tabled(rename = "unchanged")]
    unchanged: usize,
    #[tabled(rename = "conflicts")]
    conflicted: usize,
    #[tabled(rename = "skipped")]
    skipped: usize,
}

impl SyncArgs {
    pub fn run(self, verbose: bool) -> Result<()> {
        let config = self.site.resolve()?;
        let root = &self.site.root;

        let report = pipeline::run(root, &config, self.dry_run)
            .with_context(|| format!("sync failed for '{}'", root.display()))?;

        if self.json {
            let payload = SyncJson {
                report: &report,
                summary: report.summary(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize sync report")?
            );
            return Ok(());
        }

        print_report(root, &report, verbose);
        Ok(())
    }
}

fn print_report(root: &Path, report: &SyncReport, verbose: bool) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let summary = report.summary();

    if summary.total() == 0 {
        println!("{prefix}✓ no pages to check ({})", report.basis);
        return;
    }

    for file in &report.files {
        let path = display_path(root, &file.path);
        let path = path.display();
        match &file.action {
            Action::Renamed { to } => println!(
                "  {}  {path} → {}",
                "✎".green(),
                display_path(root, to).display()
            ),
            Action::WouldRename { to } => println!(
                "  {}  {path} → {}",
                "~".cyan(),
                display_path(root, to).display()
            ),
            Action::Updated { permalink } => {
                println!("  {}  {path} (permalink: {permalink})", "✎".green())
            }
            Action::WouldUpdate { permalink } => {
                println!("  {}  {path} (permalink: {permalink})", "~".cyan())
            }
            Action::Conflict { target } => println!(
                "  {}  {path}: {} already exists",
                "✗".yellow(),
                display_path(root, target).display()
            ),
            Action::Skipped { kind, message } if verbose => {
                println!("  {}  {path} [{kind}] {message}", "·".bright_black())
            }
            Action::Skipped { .. } | Action::Unchanged => {}
        }
    }

    if summary.has_changes() {
        println!("{prefix}✓ {} pages checked ({})", summary.total(), report.basis);
    } else {
        println!("{prefix}✓ nothing to do ({})", report.basis);
    }

    let mut table = Table::new([SummaryRow {
        renamed: summary.renamed,
        updated: summary.updated,
        unchanged: summary.unchanged,
        conflicted: summary.conflicted,
        skipped: summary.skipped,
    }]);
    table.with(Style::rounded());
    println!("{table}");
}
