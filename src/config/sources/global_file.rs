//! User-level config file: ~/.config/folio/config.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::PathBuf;
use tracing::debug;

pub fn global_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/folio/config.toml"))
}

/// Layer the user-level file when present; a missing file is not an error.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Some(path) = global_config_path() else {
        return Ok(builder);
    };
    if !path.is_file() {
        debug!(config_path = %path.display(), "No user-level configuration file");
        return Ok(builder);
    }
    let resolved = path.canonicalize().unwrap_or(path);
    Ok(builder.add_source(File::from(resolved).required(false)))
}
