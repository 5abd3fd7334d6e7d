//! Candidate discovery for full-scan and structured modes.

use std::path::Path;

use walkdir::WalkDir;

use tether_core::types::PageFile;

use crate::error::SyncError;

/// Every file under `pages_root` carrying `extension`, sorted by path.
///
/// Walking with `sort_by_file_name` already yields path order; a directory's
/// contents follow the directory entry itself.
///
/// Entries that cannot be read while walking are skipped.
pub fn discover(pages_root: &Path, extension: &str) -> Result<Vec<PageFile>, SyncError> {
    if !pages_root.is_dir() {
        return Err(SyncError::PagesDirMissing {
            path: pages_root.to_path_buf(),
        });
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(pages_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(page) = PageFile::from_path(entry.into_path(), extension) {
            pages.push(page);
        }
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_nested_pages_in_path_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("team")).unwrap();
        fs::write(dir.path().join("b.yaml"), "").unwrap();
        fs::write(dir.path().join("a.yaml"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::write(dir.path().join("team").join("c.yaml"), "").unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a").join("z.yaml"), "").unwrap();
        fs::create_dir_all(dir.path().join("dir.yaml")).unwrap();

        let pages = discover(dir.path(), "yaml").unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                Path::new("a").join("z.yaml"),
                Path::new("a.yaml").to_path_buf(),
                Path::new("b.yaml").to_path_buf(),
                Path::new("team").join("c.yaml"),
            ]
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("nope"), "yaml").unwrap_err();
        assert!(matches!(err, SyncError::PagesDirMissing { .. }));
    }
}
