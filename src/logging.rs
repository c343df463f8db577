//! Logging System
//!
//! Structured logging using the `tracing` crate. The content store only emits
//! events; hosts that want them rendered call [`init_logging`] once at startup.

use crate::error::ContentError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LEVEL_VAR: &str = "FOLIO_LOG";
const MODULES_VAR: &str = "FOLIO_LOG_MODULES";
const FORMAT_VAR: &str = "FOLIO_LOG_FORMAT";
const OUTPUT_VAR: &str = "FOLIO_LOG_OUTPUT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error or off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// json or text
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout, stderr or file
    #[serde(default = "default_output")]
    pub output: String,

    /// Destination when `output` is "file"
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// ANSI colors for text output on a terminal stream
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-module level overrides, e.g. `folio::manager = "trace"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(".folio/folio.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

impl Format {
    fn parse(format: &str) -> Result<Self, ContentError> {
        match format {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(ContentError::Config(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
    File,
}

impl Output {
    fn parse(output: &str) -> Result<Self, ContentError> {
        match output {
            "stdout" => Ok(Output::Stdout),
            "stderr" => Ok(Output::Stderr),
            "file" => Ok(Output::File),
            other => Err(ContentError::Config(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
                other
            ))),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `FOLIO_LOG`, `FOLIO_LOG_MODULES`, `FOLIO_LOG_FORMAT` and `FOLIO_LOG_OUTPUT`
/// take precedence over `config`, which takes precedence over the defaults.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ContentError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    let filter = build_env_filter(config)?;
    let format = match std::env::var(FORMAT_VAR) {
        Ok(from_env) => Format::parse(&from_env).or_else(|_| Format::parse(&config.format))?,
        Err(_) => Format::parse(&config.format)?,
    };
    let output = match std::env::var(OUTPUT_VAR) {
        Ok(from_env) => Output::parse(&from_env)?,
        Err(_) => Output::parse(&config.output)?,
    };
    let ansi = config.color && output != Output::File;
    let writer = make_writer(output, &config.file)?;

    let registry = Registry::default().with(filter);
    let installed = match format {
        Format::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        Format::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };
    installed.map_err(|e| ContentError::Config(format!("Failed to install logger: {}", e)))
}

fn make_writer(output: Output, log_file: &Path) -> Result<BoxMakeWriter, ContentError> {
    match output {
        Output::Stdout => Ok(BoxMakeWriter::new(std::io::stdout)),
        Output::Stderr => Ok(BoxMakeWriter::new(std::io::stderr)),
        Output::File => {
            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ContentError::Config(format!("Failed to create log directory: {}", e))
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .map_err(|e| {
                    ContentError::Config(format!("Failed to open log file {:?}: {}", log_file, e))
                })?;
            Ok(BoxMakeWriter::new(std::sync::Mutex::new(file)))
        }
    }
}

/// `FOLIO_LOG` replaces the filter entirely; otherwise the configured level
/// plus module directives from the config and then `FOLIO_LOG_MODULES`.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ContentError> {
    if let Ok(filter) = EnvFilter::try_from_env(LEVEL_VAR) {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let from_config = config
        .modules
        .iter()
        .map(|(module, level)| (module.clone(), level.clone()));
    let from_env: Vec<(String, String)> = std::env::var(MODULES_VAR)
        .map(|spec| parse_module_levels(&spec))
        .unwrap_or_default();

    from_config
        .chain(from_env)
        .try_fold(EnvFilter::new(&config.level), |filter, (module, level)| {
            let directive = format!("{}={}", module, level)
                .parse::<Directive>()
                .map_err(|e| {
                    ContentError::Config(format!(
                        "Invalid log directive {}={}: {}",
                        module, level, e
                    ))
                })?;
            Ok(filter.add_directive(directive))
        })
}

/// Parse `a=debug,b::c=trace`; malformed entries are skipped.
fn parse_module_levels(spec: &str) -> Vec<(String, String)> {
    spec.split(',')
        .filter_map(|entry| {
            let (module, level) = entry.split_once('=')?;
            let (module, level) = (module.trim(), level.trim());
            (!module.is_empty() && !level.is_empty())
                .then(|| (module.to_string(), level.to_string()))
        })
        .collect()
}
