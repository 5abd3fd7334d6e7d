//! Per-file outcomes and the aggregated run report.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use tether_core::types::{ChangeBasis, PermalinkValue};

use crate::error::FileError;

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// File renamed to match its declared permalink.
    Renamed { to: PathBuf },
    /// Field written to match the file name.
    Updated { permalink: PermalinkValue },
    /// `--dry-run`: the file *would* have been renamed.
    WouldRename { to: PathBuf },
    /// `--dry-run`: the field *would* have been written.
    WouldUpdate { permalink: PermalinkValue },
    /// Name and field already agree (or nothing changed in diff mode).
    Unchanged,
    /// Rename target already exists; nothing was modified.
    Conflict { target: PathBuf },
    /// The page was skipped; `kind` is [`FileError::kind`].
    Skipped { kind: String, message: String },
}

impl From<FileError> for Action {
    fn from(err: FileError) -> Self {
        match err {
            FileError::RenameConflict { target, .. } => Self::Conflict { target },
            other => Self::Skipped {
                kind: other.kind().to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Outcome for a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    /// Path of the page before the run touched it.
    pub path: PathBuf,
    #[serde(flatten)]
    pub action: Action,
}

/// Counts per outcome class. Dry-run variants count with their real
/// counterparts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub renamed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub conflicted: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.renamed + self.updated + self.unchanged + self.conflicted + self.skipped
    }

    /// `true` when the run changed (or would change) something on disk.
    pub fn has_changes(&self) -> bool {
        self.renamed + self.updated > 0
    }
}

/// Result of one sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub basis: ChangeBasis,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files: Vec<FileOutcome>,
}

impl SyncReport {
    pub fn summary(&self) -> Summary {
        let mut s = Summary::default();
        for file in &self.files {
            match file.action {
                Action::Renamed { .. } | Action::WouldRename { .. } => s.renamed += 1,
                Action::Updated { .. } | Action::WouldUpdate { .. } => s.updated += 1,
                Action::Unchanged => s.unchanged += 1,
                Action::Conflict { .. } => s.conflicted += 1,
                Action::Skipped { .. } => s.skipped += 1,
            }
        }
        s
    }
}
