//! Environment variable source: SERIALDB_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "SERIALDB";

/// Add environment variable overlay to builder.
/// `SERIALDB_ROOT` sets `root`; `SERIALDB_LOGGING__LEVEL` sets `logging.level`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__"),
    );
    Ok(builder)
}
