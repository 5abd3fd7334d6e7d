//! The synchronization rule: decide which side of a page is authoritative and
//! bring the other side in line.
//!
//! | case | trigger                                   | effect                          |
//! |------|-------------------------------------------|---------------------------------|
//! | A    | field declared (and, in diff mode, changed) | rename file to `normalize(field)` |
//! | B    | no field (full-scan / structured)         | write field = `normalize(stem)` |
//! | C    | diff mode, file name changed              | rewrite field = `normalize(stem)` |
//!
//! [`Reconciler::plan`] is pure apart from reading the page and probing the
//! rename target; [`Reconciler::apply`] performs the side effect.

use std::path::PathBuf;

use tether_core::{
    types::{ChangeBasis, EditStrategy, PageFile, PermalinkValue},
    Config,
};

use crate::codec::{self, PageCodec};
use crate::error::FileError;
use crate::report::{Action, FileOutcome};
use crate::writer;

/// Planned change for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Unchanged,
    /// Case A.
    Rename { to: PathBuf, permalink: PermalinkValue },
    /// Cases B and C.
    Rewrite {
        permalink: PermalinkValue,
        before: String,
        after: String,
    },
}

/// Applies the synchronization rule for one [`ChangeBasis`].
pub struct Reconciler {
    basis: ChangeBasis,
    codec: Box<dyn PageCodec>,
}

impl Reconciler {
    pub fn new(basis: ChangeBasis, edit: EditStrategy, field: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            basis,
            codec: codec::for_strategy(edit, field)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, regex::Error> {
        Self::new(config.mode, config.edit_strategy(), &config.field)
    }

    /// Decide what to do with `page`.
    ///
    /// `prior` is the page's content at the previous revision and is only
    /// consulted in diff mode, where `None` means the page is new.
    pub fn plan(&self, page: &PageFile, prior: Option<&str>) -> Result<Plan, FileError> {
        let content = std::fs::read_to_string(&page.path).map_err(|source| FileError::Read {
            path: page.path.clone(),
            source,
        })?;
        let parse_err = |source| FileError::Parse {
            path: page.path.clone(),
            source,
        };
        let declared = self.codec.declared(&content).map_err(parse_err)?;

        match self.basis {
            ChangeBasis::FullScan | ChangeBasis::Structured => match declared {
                Some(declared) => self.plan_rename(page, &declared),
                None => self.plan_rewrite(page, content, page.inferred_permalink()),
            },
            ChangeBasis::Diff => {
                let old = match prior {
                    Some(text) => self.codec.declared(text).map_err(parse_err)?,
                    None => None,
                };
                let inferred = page.inferred_permalink();

                match declared {
                    Some(declared) if Some(&declared) != old.as_ref() => {
                        self.plan_rename(page, &declared)
                    }
                    _ if old.as_deref() != Some(inferred.as_str()) => {
                        self.plan_rewrite(page, content, inferred)
                    }
                    _ => Ok(Plan::Unchanged),
                }
            }
        }
    }

    fn plan_rename(&self, page: &PageFile, declared: &str) -> Result<Plan, FileError> {
        let permalink = PermalinkValue::normalize(declared);
        if !permalink.is_plain_file_stem() {
            return Err(FileError::InvalidName {
                path: page.path.clone(),
                permalink: permalink.to_string(),
            });
        }
        if permalink.file_name(&page.extension) == page.file_name() {
            return Ok(Plan::Unchanged);
        }

        let to = page.sibling_for(&permalink);
        if to.exists() {
            return Err(FileError::RenameConflict {
                path: page.path.clone(),
                target: to,
            });
        }
        Ok(Plan::Rename { to, permalink })
    }

    fn plan_rewrite(
        &self,
        page: &PageFile,
        before: String,
        permalink: PermalinkValue,
    ) -> Result<Plan, FileError> {
        let after = self
            .codec
            .set_permalink(&before, &permalink)
            .map_err(|source| FileError::Parse {
                path: page.path.clone(),
                source,
            })?;
        if after == before {
            return Ok(Plan::Unchanged);
        }
        Ok(Plan::Rewrite {
            permalink,
            before,
            after,
        })
    }

    /// Carry out `plan`. In dry-run mode nothing touches disk.
    pub fn apply(&self, page: &PageFile, plan: Plan, dry_run: bool) -> Result<Action, FileError> {
        match plan {
            Plan::Unchanged => Ok(Action::Unchanged),
            Plan::Rename { to, .. } if dry_run => Ok(Action::WouldRename { to }),
            Plan::Rewrite { permalink, .. } if dry_run => Ok(Action::WouldUpdate { permalink }),
            Plan::Rename { to, .. } => {
                writer::rename_no_clobber(&page.path, &to)?;
                tracing::info!("renamed: {} -> {}", page.path.display(), to.display());
                Ok(Action::Renamed { to })
            }
            Plan::Rewrite {
                permalink, after, ..
            } => {
                writer::atomic_write(&page.path, &after)?;
                tracing::info!("updated: {} (permalink: {permalink})", page.path.display());
                Ok(Action::Updated { permalink })
            }
        }
    }

    /// Plan and apply for one page. Never fails: errors become
    /// [`Action::Conflict`] or [`Action::Skipped`].
    pub fn reconcile(&self, page: &PageFile, prior: Option<&str>, dry_run: bool) -> FileOutcome {
        let result = self
            .plan(page, prior)
            .and_then(|plan| self.apply(page, plan, dry_run));

        let action = match result {
            Ok(action) => action,
            Err(err @ FileError::RenameConflict { .. }) => {
                tracing::info!("{err}");
                err.into()
            }
            Err(err) => {
                tracing::debug!("skipped: {err}");
                err.into()
            }
        };
        FileOutcome {
            path: page.path.clone(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn page(dir: &Path, name: &str, content: &str) -> PageFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        PageFile::from_path(path, "yaml").unwrap()
    }

    fn full_scan() -> Reconciler {
        Reconciler::new(ChangeBasis::FullScan, EditStrategy::Lines, "permalink").unwrap()
    }

    fn diff() -> Reconciler {
        Reconciler::new(ChangeBasis::Diff, EditStrategy::Lines, "permalink").unwrap()
    }

    #[test]
    fn matching_page_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "about.yaml", "title: A\npermalink: about\n");
        assert_eq!(full_scan().plan(&p, None).unwrap(), Plan::Unchanged);
    }

    #[test]
    fn declared_field_plans_rename() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "a.yaml", "permalink: \"b page\"\n");
        match full_scan().plan(&p, None).unwrap() {
            Plan::Rename { to, permalink } => {
                assert_eq!(to, dir.path().join("b-page.yaml"));
                assert_eq!(permalink.as_str(), "b-page");
            }
            other => panic!("expected rename, got {other:?}"),
        }
    }

    #[test]
    fn existing_target_is_a_conflict() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "a.yaml", "permalink: b\n");
        fs::write(dir.path().join("b.yaml"), "taken").unwrap();
        let err = full_scan().plan(&p, None).unwrap_err();
        assert!(matches!(err, FileError::RenameConflict { .. }));
    }

    #[test]
    fn path_like_permalink_is_refused() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "a.yaml", "permalink: ../escape\n");
        let err = full_scan().plan(&p, None).unwrap_err();
        assert!(matches!(err, FileError::InvalidName { .. }));
    }

    #[test]
    fn missing_field_plans_insert() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "our team.yaml", "title: Team\n");
        match full_scan().plan(&p, None).unwrap() {
            Plan::Rewrite { permalink, after, .. } => {
                assert_eq!(permalink.as_str(), "our-team");
                assert_eq!(after, "title: Team\npermalink: our-team\n");
            }
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn diff_field_change_wins() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "old.yaml", "permalink: fresh\n");
        let plan = diff().plan(&p, Some("permalink: old\n")).unwrap();
        assert!(matches!(plan, Plan::Rename { .. }), "got {plan:?}");
    }

    #[test]
    fn diff_filename_change_rewrites_field() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "new-name.yaml", "title: A\npermalink: old-name\n");
        match diff().plan(&p, Some("title: A\npermalink: old-name\n")).unwrap() {
            Plan::Rewrite { after, .. } => assert_eq!(after, "title: A\npermalink: new-name\n"),
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn diff_nothing_changed_is_noop() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "same.yaml", "title: B\npermalink: same\n");
        let plan = diff().plan(&p, Some("title: A\npermalink: same\n")).unwrap();
        assert_eq!(plan, Plan::Unchanged);
    }

    #[test]
    fn diff_new_page_with_field_renames() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "draft.yaml", "permalink: launch\n");
        let plan = diff().plan(&p, None).unwrap();
        assert!(matches!(plan, Plan::Rename { .. }), "got {plan:?}");
    }

    #[test]
    fn diff_new_page_without_field_inserts() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "draft.yaml", "title: Draft\n");
        match diff().plan(&p, None).unwrap() {
            Plan::Rewrite { permalink, .. } => assert_eq!(permalink.as_str(), "draft"),
            other => panic!("expected rewrite, got {other:?}"),
        }
    }

    #[test]
    fn dry_run_apply_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let p = page(dir.path(), "a.yaml", "permalink: b\n");
        let r = full_scan();
        let plan = r.plan(&p, None).unwrap();
        let action = r.apply(&p, plan, true).unwrap();
        assert!(matches!(action, Action::WouldRename { .. }));
        assert!(p.path.exists());
        assert!(!dir.path().join("b.yaml").exists());
    }

    #[test]
    fn unreadable_page_is_skipped_as_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let p = PageFile::from_path(path.clone(), "yaml").unwrap();

        let outcome = full_scan().reconcile(&p, None, false);
        match outcome.action {
            Action::Skipped { kind, .. } => assert_eq!(kind, "read"),
            other => panic!("expected skip, got {other:?}"),
        }
        assert_eq!(fs::read(&path).unwrap(), vec![0xff, 0xfe, 0x00]);
    }
}
