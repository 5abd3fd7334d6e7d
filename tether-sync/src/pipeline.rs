//! Shared sync pipeline entrypoint used by `tether sync` and `tether diff`.

use std::path::{Path, PathBuf};

use chrono::Utc;

use tether_core::{
    types::{ChangeBasis, PageFile},
    Config,
};

use crate::error::{io_err, FileError, SyncError};
use crate::history::{GitHistory, History};
use crate::reconcile::Reconciler;
use crate::report::{FileOutcome, SyncReport};
use crate::scan;

/// A page selected for reconciliation.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub page: PageFile,
    /// Path at the previous revision (diff mode only).
    pub previous: Option<PathBuf>,
}

impl Candidate {
    /// Previous-revision content, or `None` outside diff mode / for new pages.
    pub fn prior(&self, history: Option<&dyn History>) -> Result<Option<String>, FileError> {
        let (Some(history), Some(previous)) = (history, self.previous.as_ref()) else {
            return Ok(None);
        };
        history
            .previous_content(previous)
            .map_err(|source| FileError::History {
                path: self.page.path.clone(),
                source,
            })
    }
}

/// Run the sync pipeline for `root`.
///
/// Diff mode opens the git repository containing `root`; the other modes walk
/// the pages directory.
pub fn run(root: &Path, config: &Config, dry_run: bool) -> Result<SyncReport, SyncError> {
    match config.mode {
        ChangeBasis::Diff => {
            let history = GitHistory::open(root, &config.base_rev, &config.head_rev)?;
            run_with_history(root, config, Some(&history), dry_run)
        }
        ChangeBasis::FullScan | ChangeBasis::Structured => {
            run_with_history(root, config, None, dry_run)
        }
    }
}

/// Run the pipeline with an explicit history collaborator.
///
/// Pages are processed one at a time in candidate order; a failing page never
/// stops the pages after it.
pub fn run_with_history(
    root: &Path,
    config: &Config,
    history: Option<&dyn History>,
    dry_run: bool,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();
    let reconciler = Reconciler::from_config(config)?;
    let candidates = collect(root, config, history)?;

    let mut files = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let outcome = match candidate.prior(history) {
            Ok(prior) => reconciler.reconcile(&candidate.page, prior.as_deref(), dry_run),
            Err(err) => {
                tracing::debug!("skipped: {err}");
                FileOutcome {
                    path: candidate.page.path.clone(),
                    action: err.into(),
                }
            }
        };
        files.push(outcome);
    }

    Ok(SyncReport {
        basis: config.mode,
        dry_run,
        started_at,
        finished_at: Utc::now(),
        files,
    })
}

/// Candidate pages for `config.mode`.
pub(crate) fn collect(
    root: &Path,
    config: &Config,
    history: Option<&dyn History>,
) -> Result<Vec<Candidate>, SyncError> {
    let pages_root = config.pages_root(root);

    if config.mode != ChangeBasis::Diff {
        return Ok(scan::discover(&pages_root, &config.extension)?
            .into_iter()
            .map(|page| Candidate {
                page,
                previous: None,
            })
            .collect());
    }

    let history = history.ok_or(SyncError::HistoryRequired)?;
    if !pages_root.is_dir() {
        return Err(SyncError::PagesDirMissing { path: pages_root });
    }
    let pages_root = pages_root
        .canonicalize()
        .map_err(|e| io_err(&pages_root, e))?;

    Ok(history
        .changed_paths()?
        .into_iter()
        .filter(|changed| changed.path.starts_with(&pages_root))
        .filter_map(|changed| {
            PageFile::from_path(changed.path, &config.extension).map(|page| Candidate {
                page,
                previous: changed.previous,
            })
        })
        .collect())
}
