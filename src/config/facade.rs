//! ConfigLoader facade over the file and environment sources.

use super::sources::{environment, file};
use super::ProviderConfig;
use config::{Config, ConfigError};
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file with the environment overlaid.
    /// Precedence: file (lowest) -> environment (highest).
    pub fn load_from_file(path: &Path) -> Result<ProviderConfig, ConfigError> {
        let builder = file::add_to_builder(Config::builder(), path)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load configuration from the environment alone.
    pub fn load_from_env() -> Result<ProviderConfig, ConfigError> {
        let builder = environment::add_to_builder(Config::builder())?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
