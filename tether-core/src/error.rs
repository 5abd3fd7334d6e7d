//! Error types for tether-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, unreadable file, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with file path and serde_yaml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `init` refused to overwrite an existing config file.
    #[error("config already exists at {path}")]
    AlreadyExists { path: PathBuf },

    /// A value parsed but is unusable (empty extension, absolute pages dir, ...).
    #[error("invalid config value for `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}
