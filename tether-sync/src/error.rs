//! Error types for tether-sync.
//!
//! Two layers: [`SyncError`] aborts a whole run (bad field pattern, missing
//! pages directory, history unavailable); [`FileError`] is contained to one
//! page and ends up in the report.

use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CodecError;
use crate::history::HistoryError;

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The version-control collaborator could not list changes.
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// The field pattern could not be compiled.
    #[error("invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The configured pages directory does not exist.
    #[error("pages directory not found at {path}")]
    PagesDirMissing { path: PathBuf },

    /// Diff mode was selected without a history collaborator.
    #[error("diff mode requires a version-control history")]
    HistoryRequired,

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Per-page failures. None of these abort the run.
#[derive(Debug, Error)]
pub enum FileError {
    /// The page could not be read or is not valid UTF-8.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The page (or its previous revision) could not be parsed.
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// A file already occupies the rename target.
    #[error("rename skipped (conflict): {target} already exists")]
    RenameConflict { path: PathBuf, target: PathBuf },

    /// The rename or the content rewrite failed.
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The previous revision could not be retrieved.
    #[error("history lookup failed for {path}: {source}")]
    History {
        path: PathBuf,
        #[source]
        source: HistoryError,
    },

    /// The declared permalink cannot be used as a sibling file name.
    #[error("permalink '{permalink}' in {path} is not a plain file name")]
    InvalidName { path: PathBuf, permalink: String },
}

impl FileError {
    /// Stable short label, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
            Self::RenameConflict { .. } => "conflict",
            Self::Write { .. } => "write",
            Self::History { .. } => "history",
            Self::InvalidName { .. } => "invalid_name",
        }
    }
}
