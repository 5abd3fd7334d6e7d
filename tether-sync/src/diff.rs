//! Dry-run preview support for `tether diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use tether_core::{types::ChangeBasis, Config};

use crate::error::{FileError, SyncError};
use crate::history::{GitHistory, History};
use crate::pipeline::collect;
use crate::reconcile::{Plan, Reconciler};

/// A single planned change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// The file would be renamed.
    Rename { from: PathBuf, to: PathBuf },
    /// The file's content would change; `unified_diff` is ready to print.
    Edit { path: PathBuf, unified_diff: String },
    /// The rename target is taken; nothing would happen.
    Conflict { path: PathBuf, target: PathBuf },
}

/// Compute what `sync` would do for `root` without writing anything.
pub fn preview(root: &Path, config: &Config) -> Result<Vec<Preview>, SyncError> {
    match config.mode {
        ChangeBasis::Diff => {
            let history = GitHistory::open(root, &config.base_rev, &config.head_rev)?;
            preview_with_history(root, config, Some(&history))
        }
        ChangeBasis::FullScan | ChangeBasis::Structured => preview_with_history(root, config, None),
    }
}

/// [`preview`] with an explicit history collaborator.
pub fn preview_with_history(
    root: &Path,
    config: &Config,
    history: Option<&dyn History>,
) -> Result<Vec<Preview>, SyncError> {
    let reconciler = Reconciler::from_config(config)?;
    let mut previews = Vec::new();

    for candidate in collect(root, config, history)? {
        let page = &candidate.page;
        let plan = candidate
            .prior(history)
            .and_then(|prior| reconciler.plan(page, prior.as_deref()));

        match plan {
            Ok(Plan::Unchanged) => {}
            Ok(Plan::Rename { to, .. }) => previews.push(Preview::Rename {
                from: page.path.clone(),
                to,
            }),
            Ok(Plan::Rewrite { before, after, .. }) => {
                let relative = display_path(root, &page.path);
                let old_header = format!("a/{}", relative.display());
                let new_header = format!("b/{}", relative.display());
                let unified = TextDiff::from_lines(&before, &after)
                    .unified_diff()
                    .header(&old_header, &new_header)
                    .context_radius(3)
                    .to_string();
                previews.push(Preview::Edit {
                    path: page.path.clone(),
                    unified_diff: unified,
                });
            }
            Err(FileError::RenameConflict { path, target }) => {
                previews.push(Preview::Conflict { path, target })
            }
            Err(err) => tracing::debug!("skipped: {err}"),
        }
    }

    Ok(previews)
}

/// `path` relative to `root` when possible (diff mode reports canonical paths).
pub fn display_path(root: &Path, path: &Path) -> PathBuf {
    if let Ok(rel) = path.strip_prefix(root) {
        return rel.to_path_buf();
    }
    root.canonicalize()
        .ok()
        .and_then(|canonical| path.strip_prefix(canonical).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
}
