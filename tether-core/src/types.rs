//! Domain types for permalink synchronization.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PermalinkValue
// ---------------------------------------------------------------------------

/// A normalized permalink.
///
/// Construction always goes through [`PermalinkValue::normalize`], so every
/// value held by this type is already in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PermalinkValue(String);

impl PermalinkValue {
    /// Trim surrounding whitespace and replace interior spaces with hyphens.
    ///
    /// Idempotent: normalizing an already-normalized value is a no-op.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().replace(' ', "-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the value can be used verbatim as a file stem in the same
    /// directory (no separators, not `.` or `..`).
    pub fn is_plain_file_stem(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self.0.contains('/')
            && !self.0.contains('\\')
    }

    /// `<value>.<extension>`
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0, extension)
    }
}

impl fmt::Display for PermalinkValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PermalinkValue {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl From<String> for PermalinkValue {
    fn from(s: String) -> Self {
        Self::normalize(&s)
    }
}

impl PartialEq<str> for PermalinkValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// ---------------------------------------------------------------------------
// PageFile
// ---------------------------------------------------------------------------

/// A page-definition file discovered under the pages directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    pub path: PathBuf,
    pub directory: PathBuf,
    pub filename_stem: String,
    pub extension: String,
}

impl PageFile {
    /// Build a `PageFile` from a path, returning `None` when the path has no
    /// UTF-8 file stem or does not carry `extension`.
    pub fn from_path(path: impl Into<PathBuf>, extension: &str) -> Option<Self> {
        let path = path.into();
        let ext = path.extension()?.to_str()?;
        if ext != extension {
            return None;
        }
        let filename_stem = path.file_stem()?.to_str()?.to_owned();
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Some(Self {
            path,
            directory,
            filename_stem,
            extension: extension.to_owned(),
        })
    }

    /// Current file name including extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.filename_stem, self.extension)
    }

    /// Permalink implied by the current file name.
    pub fn inferred_permalink(&self) -> PermalinkValue {
        PermalinkValue::normalize(&self.filename_stem)
    }

    /// Sibling path this page would occupy if renamed to `permalink`.
    pub fn sibling_for(&self, permalink: &PermalinkValue) -> PathBuf {
        self.directory.join(permalink.file_name(&self.extension))
    }
}

// ---------------------------------------------------------------------------
// ChangeBasis
// ---------------------------------------------------------------------------

/// Signal used to decide which side (field or filename) is authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeBasis {
    /// Current state only; a declared field always wins.
    #[default]
    FullScan,
    /// Compare against the previous revision; whichever side changed wins.
    Diff,
    /// Like `FullScan`, but the file is parsed as a key/value document.
    Structured,
}

impl ChangeBasis {
    /// Edit strategy paired with this basis when none is configured.
    pub fn default_edit(self) -> EditStrategy {
        match self {
            Self::FullScan | Self::Diff => EditStrategy::Lines,
            Self::Structured => EditStrategy::Document,
        }
    }
}

impl fmt::Display for ChangeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FullScan => "full-scan",
            Self::Diff => "diff",
            Self::Structured => "structured",
        };
        f.write_str(s)
    }
}

impl FromStr for ChangeBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" | "full-scan" | "fullscan" => Ok(Self::FullScan),
            "diff" => Ok(Self::Diff),
            "structured" => Ok(Self::Structured),
            other => Err(format!(
                "unknown mode '{other}'; expected: full-scan, diff, structured"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// EditStrategy
// ---------------------------------------------------------------------------

/// How the permalink field is located and rewritten inside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditStrategy {
    /// Regex line surgery; unrelated formatting is preserved exactly.
    Lines,
    /// Parse into a mapping and re-serialize the whole document.
    Document,
}

impl fmt::Display for EditStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lines => f.write_str("lines"),
            Self::Document => f.write_str("document"),
        }
    }
}

impl FromStr for EditStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lines" | "line" => Ok(Self::Lines),
            "document" | "doc" => Ok(Self::Document),
            other => Err(format!(
                "unknown edit strategy '{other}'; expected: lines, document"
            )),
        }
    }
}
