//! Configuration System
//!
//! Layered configuration for the content runtime: defaults, the user-level
//! config file, workspace config files and `FOLIO__*` environment overrides.

use crate::ids::DEFAULT_BLOCK_SIZE;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    /// Content store location and durability
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logical id allocation
    #[serde(default)]
    pub identifiers: IdentifierConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the sled database
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Flush the database after every row write
    #[serde(default)]
    pub flush_on_save: bool,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".folio/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            flush_on_save: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierConfig {
    /// Number of logical ids reserved per trip to storage
    #[serde(default = "default_block_size")]
    pub block_size: u64,
}

fn default_block_size() -> u64 {
    DEFAULT_BLOCK_SIZE
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Storage(String),
    Identifiers(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Identifiers(msg) => write!(f, "Identifiers: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FolioConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.storage.path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "Store path cannot be empty".to_string(),
            ));
        }

        if self.identifiers.block_size == 0 {
            errors.push(ValidationError::Identifiers(
                "Block size must be at least 1".to_string(),
            ));
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            errors.push(ValidationError::Logging(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                self.logging.format
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
