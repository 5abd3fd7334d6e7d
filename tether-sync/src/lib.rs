//! # tether-sync
//!
//! Permalink/filename reconciliation and sync orchestration.
//!
//! Call [`pipeline::run`] to reconcile every page under a site root, or
//! [`diff::preview`] to see what a run would change without writing.

pub mod codec;
pub mod diff;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod scan;
mod writer;

pub use diff::{preview, Preview};
pub use error::{FileError, SyncError};
pub use history::{ChangedPath, GitHistory, History, HistoryError};
pub use reconcile::{Plan, Reconciler};
pub use report::{Action, FileOutcome, Summary, SyncReport};
