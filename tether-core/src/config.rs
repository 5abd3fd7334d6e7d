//! Synchronizer configuration.
//!
//! # Lookup order
//!
//! ```text
//! <root>/.tether.yaml                 (per-site, checked in next to the content)
//! <config_dir>/tether/config.yaml     (per-user fallback)
//! built-in defaults
//! ```
//!
//! # API pattern
//!
//! Every function that touches a user-level location has two forms:
//! - `fn_at(…, config_home: Option<&Path>)`: explicit location, used in tests
//! - `fn(…)`: derives the location from `dirs::config_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ChangeBasis, EditStrategy};

/// File name of the per-site config.
pub const CONFIG_FILE_NAME: &str = ".tether.yaml";

/// Everything the pipeline needs to know about a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Directory holding page files, relative to the site root.
    pub pages_dir: PathBuf,
    /// Recognized page extension, without the leading dot.
    pub extension: String,
    /// Name of the permalink field inside a page.
    pub field: String,
    /// Change-detection basis.
    pub mode: ChangeBasis,
    /// Edit strategy; derived from `mode` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditStrategy>,
    /// Revision treated as "previous" in diff mode.
    pub base_rev: String,
    /// Revision treated as "current" in diff mode.
    pub head_rev: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_dir: PathBuf::from("src/content/pages"),
            extension: "yaml".to_string(),
            field: "permalink".to_string(),
            mode: ChangeBasis::FullScan,
            edit: None,
            base_rev: "HEAD~1".to_string(),
            head_rev: "HEAD".to_string(),
        }
    }
}

impl Config {
    /// Effective edit strategy.
    pub fn edit_strategy(&self) -> EditStrategy {
        self.edit.unwrap_or_else(|| self.mode.default_edit())
    }

    /// Absolute (or root-relative) pages directory for `root`.
    pub fn pages_root(&self, root: &Path) -> PathBuf {
        root.join(&self.pages_dir)
    }

    /// Strip a leading dot from the extension and reject unusable values.
    ///
    /// `pages_dir` must be relative to the site root.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.extension = self.extension.trim().trim_start_matches('.').to_string();
        if self.extension.is_empty() || self.extension.contains(|c: char| c == '/' || c == '\\') {
            return Err(ConfigError::Invalid {
                key: "extension",
                message: format!("'{}' is not a file extension", self.extension),
            });
        }

        if self.pages_dir.is_absolute() || self.pages_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "pages_dir",
                message: format!(
                    "'{}' must be a non-empty path relative to the site root",
                    self.pages_dir.display()
                ),
            });
        }

        self.field = self.field.trim().to_string();
        if self.field.is_empty()
            || self.field.contains(':')
            || self.field.contains(char::is_whitespace)
        {
            return Err(ConfigError::Invalid {
                key: "field",
                message: format!("'{}' is not a usable field name", self.field),
            });
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<root>/.tether.yaml`. Pure, no I/O.
pub fn site_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// `<config_home>/tether/config.yaml`. Pure, no I/O.
pub fn user_config_path_at(config_home: &Path) -> PathBuf {
    config_home.join("tether").join("config.yaml")
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Parse and validate a single config file.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Config::default().validate();
    }
    let config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate()
}

/// Resolve the config for `root`, falling back to the user-level file under
/// `config_home` and then to defaults.
pub fn load_at(root: &Path, config_home: Option<&Path>) -> Result<Config, ConfigError> {
    let site = site_config_path(root);
    if site.is_file() {
        return load_file(&site);
    }
    if let Some(home) = config_home {
        let user = user_config_path_at(home);
        if user.is_file() {
            return load_file(&user);
        }
    }
    Ok(Config::default())
}

/// `load_at` convenience wrapper.
pub fn load(root: &Path) -> Result<Config, ConfigError> {
    load_at(root, dirs::config_dir().as_deref())
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Write a default `.tether.yaml` into `root`.
///
/// Write flow: serialize → `.tether.yaml.tmp` sibling → `rename`.
/// Refuses to overwrite an existing file.
pub fn init_at(root: &Path) -> Result<PathBuf, ConfigError> {
    let path = site_config_path(root);
    if path.exists() {
        return Err(ConfigError::AlreadyExists { path });
    }
    std::fs::create_dir_all(root)?;

    let yaml = serde_yaml::to_string(&Config::default())?;
    let tmp = root.join(format!("{CONFIG_FILE_NAME}.tmp"));
    std::fs::write(&tmp, yaml)?;
    std::fs::rename(&tmp, &path)?;
    Ok(path)
}
