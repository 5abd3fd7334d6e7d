//! Tether core library: domain types, configuration and errors.
//!
//! - [`types`]: `PermalinkValue`, `PageFile`, `ChangeBasis`, `EditStrategy`
//! - [`config`]: load / init of `.tether.yaml`
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use types::{ChangeBasis, EditStrategy, PageFile, PermalinkValue};
