//! Provider configuration.
//!
//! A TOML file (or just the environment) names the serialization root, the database tag
//! for created items, the default lookup language and the logging setup.

mod facade;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use crate::types::{DEFAULT_DATABASE, DEFAULT_LANGUAGE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Serialization provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Serialization root; relative paths resolve against the current directory
    pub root: PathBuf,

    /// Database tag written into created items
    #[serde(default = "default_database")]
    pub database: String,

    /// Language used by lookups that do not name one
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ProviderConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            database: default_database(),
            language: default_language(),
            logging: LoggingConfig::default(),
        }
    }
}
