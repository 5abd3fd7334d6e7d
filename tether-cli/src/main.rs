//! Tether: keep page permalinks and file names in agreement.
//!
//! # Usage
//!
//! ```text
//! tether init [--root DIR]
//! tether sync [--root DIR] [--mode full-scan|diff|structured] [--dry-run] [--json]
//! tether diff [--root DIR] [--mode full-scan|diff|structured]
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{diff::DiffArgs, init::InitArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tether",
    version,
    about = "Keep page permalinks and file names in sync",
    long_about = None,
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `TETHER_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default `.tether.yaml` into the site root.
    Init(InitArgs),

    /// Rename files or rewrite permalink fields until both sides agree.
    Sync(SyncArgs),

    /// Show what sync would change without writing anything.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(cli.verbose > 0),
        Commands::Diff(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("TETHER_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
