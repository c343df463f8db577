//! Config loading entry points.

use super::merge::builder_with_defaults;
use super::sources::{environment, global_file, workspace_file};
use super::FolioConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (highest last): defaults, ~/.config/folio/config.toml,
    /// config/config.toml, config/{FOLIO_ENV}.toml, FOLIO__* variables.
    pub fn load(workspace_root: &Path) -> Result<FolioConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Load configuration from a single file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<FolioConfig, ConfigError> {
        builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()))
            .build()?
            .try_deserialize()
    }

    /// User-level configuration path, if HOME is set
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
