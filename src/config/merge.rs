//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("storage.path", ".folio/store")?
        .set_default("storage.flush_on_save", false)?
        .set_default("identifiers.block_size", crate::ids::DEFAULT_BLOCK_SIZE as i64)
}
