//! Previous-revision lookups for diff mode.
//!
//! [`History`] is the seam; [`GitHistory`] is the shipped implementation and
//! shells out to `git`. Nothing here writes to the repository.
//!
//! Paths crossing the trait are absolute, under the repository top level.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;

/// Errors from the version-control collaborator.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// `git` could not be spawned at all.
    #[error("git execution failed: {0}")]
    Spawn(#[source] std::io::Error),

    /// `git` ran but exited non-zero.
    #[error("git {command} failed: {stderr}")]
    Command { command: String, stderr: String },

    /// A path is not inside the repository.
    #[error("{path} is outside the repository at {root}")]
    OutsideRepository { path: PathBuf, root: PathBuf },

    /// The previous revision of a file is not UTF-8.
    #[error("previous revision of {path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },
}

/// One path that differs between the previous and the current revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    /// Path in the current revision.
    pub path: PathBuf,
    /// Path in the previous revision; `None` when the file was added.
    pub previous: Option<PathBuf>,
}

/// Version-control capabilities consumed by diff mode.
pub trait History {
    /// Paths added, modified or renamed between the previous and current
    /// revision, in the order the backend reports them. Deletions are omitted.
    fn changed_paths(&self) -> Result<Vec<ChangedPath>, HistoryError>;

    /// Content of `path` at the previous revision; `Ok(None)` when it did not
    /// exist there.
    fn previous_content(&self, path: &Path) -> Result<Option<String>, HistoryError>;
}

// ---------------------------------------------------------------------------
// GitHistory
// ---------------------------------------------------------------------------

/// [`History`] backed by the `git` CLI.
#[derive(Debug, Clone)]
pub struct GitHistory {
    toplevel: PathBuf,
    base: String,
    head: String,
    /// `false` when `base` does not resolve, e.g. on the first commit.
    base_exists: bool,
}

impl GitHistory {
    /// Open the repository containing `root` and compare `base` against `head`.
    pub fn open(root: &Path, base: &str, head: &str) -> Result<Self, HistoryError> {
        let toplevel = git_stdout(root, &["rev-parse", "--show-toplevel"])?;
        let toplevel = PathBuf::from(toplevel.trim());
        let toplevel = toplevel.canonicalize().unwrap_or(toplevel);

        let commit = format!("{base}^{{commit}}");
        let base_exists = git_command(&toplevel, &["rev-parse", "--verify", "--quiet", &commit])?
            .status
            .success();
        if !base_exists {
            tracing::debug!("base revision {base} not found; treating every file as added");
        }

        Ok(Self {
            toplevel,
            base: base.to_string(),
            head: head.to_string(),
            base_exists,
        })
    }

    fn relative(&self, path: &Path) -> Result<String, HistoryError> {
        let rel = path
            .strip_prefix(&self.toplevel)
            .map_err(|_| HistoryError::OutsideRepository {
                path: path.to_path_buf(),
                root: self.toplevel.clone(),
            })?;
        Ok(rel.to_string_lossy().replace('\\', "/"))
    }
}

impl History for GitHistory {
    fn changed_paths(&self) -> Result<Vec<ChangedPath>, HistoryError> {
        if !self.base_exists {
            let listing = git_stdout(
                &self.toplevel,
                &["ls-tree", "-r", "--name-only", "-z", &self.head],
            )?;
            return Ok(listing
                .split('\0')
                .filter(|p| !p.is_empty())
                .map(|p| ChangedPath {
                    path: self.toplevel.join(p),
                    previous: None,
                })
                .collect());
        }

        let listing = git_stdout(
            &self.toplevel,
            &["diff", "--name-status", "-M", "-z", &self.base, &self.head],
        )?;
        Ok(parse_name_status(&listing)
            .into_iter()
            .map(|(path, previous)| ChangedPath {
                path: self.toplevel.join(path),
                previous: previous.map(|p| self.toplevel.join(p)),
            })
            .collect())
    }

    fn previous_content(&self, path: &Path) -> Result<Option<String>, HistoryError> {
        if !self.base_exists {
            return Ok(None);
        }
        let spec = format!("{}:{}", self.base, self.relative(path)?);

        let output = git_command(&self.toplevel, &["show", &spec])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if missing_at_revision(&stderr) {
                return Ok(None);
            }
            return Err(HistoryError::Command {
                command: "show".to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        String::from_utf8(output.stdout)
            .map(Some)
            .map_err(|_| HistoryError::NotUtf8 {
                path: path.to_path_buf(),
            })
    }
}

/// `git show <rev>:<path>` failed because the path is not in `<rev>`.
fn missing_at_revision(stderr: &str) -> bool {
    stderr.contains("does not exist in") || stderr.contains("exists on disk, but not in")
}

/// Parse `git diff --name-status -z` into `(current, previous)` pairs.
///
/// Added files have no previous path; modified files share one; renames and
/// copies carry the source; deletions are dropped.
fn parse_name_status(listing: &str) -> Vec<(String, Option<String>)> {
    let mut fields = listing.split('\0').filter(|f| !f.is_empty());
    let mut out = Vec::new();
    while let Some(status) = fields.next() {
        match status.chars().next() {
            Some('R') | Some('C') => {
                let (Some(from), Some(to)) = (fields.next(), fields.next()) else {
                    break;
                };
                out.push((to.to_string(), Some(from.to_string())));
            }
            Some('A') => {
                if let Some(path) = fields.next() {
                    out.push((path.to_string(), None));
                }
            }
            Some('D') => {
                fields.next();
            }
            Some(_) => {
                if let Some(path) = fields.next() {
                    out.push((path.to_string(), Some(path.to_string())));
                }
            }
            None => {}
        }
    }
    out
}

/// Run `git -C dir args…` with untranslated messages.
fn git_command(dir: &Path, args: &[&str]) -> Result<Output, HistoryError> {
    Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("LC_ALL", "C")
        .output()
        .map_err(HistoryError::Spawn)
}

fn git_output(dir: &Path, args: &[&str]) -> Result<Vec<u8>, HistoryError> {
    let output = git_command(dir, args)?;
    if !output.status.success() {
        return Err(HistoryError::Command {
            command: args.first().copied().unwrap_or_default().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

fn git_stdout(dir: &Path, args: &[&str]) -> Result<String, HistoryError> {
    git_output(dir, args).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
