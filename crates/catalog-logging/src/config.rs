//! Logging configuration
//!
//! A [`LogConfig`] decides where log lines go (console, file or both), how
//! they are formatted, and which level each catalog component logs at.
//! `RUST_LOG` still overrides every level when set.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_appender::rolling::Rotation;

use crate::LoggingError;

/// Environment variable naming a log directory; setting it enables file output
pub const ENV_LOG_DIR: &str = "CATALOG_LOG_DIR";
/// Environment variable selecting the console format (`json` or `pretty`)
pub const ENV_LOG_FORMAT: &str = "CATALOG_LOG_FORMAT";

/// Target of the resolver pipeline's events and spans
const RESOLVER_TARGET: &str = "catalog_resolver";
/// Target of the in-memory stores' events
const STORAGE_TARGET: &str = "catalog_storage";

/// Main logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for every target without a more specific level
    pub default_level: String,
    /// Level for the resolver pipeline, if it differs from the default
    pub resolver_level: Option<String>,
    /// Level for the in-memory stores, if it differs from the default
    pub storage_level: Option<String>,
    pub console: ConsoleConfig,
    pub file: Option<FileConfig>,
    pub json: JsonFields,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            resolver_level: None,
            storage_level: None,
            console: ConsoleConfig::default(),
            file: None,
            json: JsonFields::default(),
        }
    }
}

impl LogConfig {
    /// Pretty console output, with per-definition resolver detail
    pub fn development() -> Self {
        Self {
            resolver_level: Some("debug".to_string()),
            console: ConsoleConfig {
                enabled: true,
                format: ConsoleFormat::Pretty,
                ansi: true,
            },
            ..Default::default()
        }
    }

    /// Daily-rotated JSONL files under `log_dir`, no console
    ///
    /// Store chatter is held back to warnings.
    pub fn production(log_dir: PathBuf) -> Self {
        Self {
            storage_level: Some("warn".to_string()),
            console: ConsoleConfig {
                enabled: false,
                ..Default::default()
            },
            file: Some(FileConfig {
                directory: log_dir,
                max_files: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Warnings only, on the console
    pub fn testing() -> Self {
        Self {
            default_level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// Default config adjusted by `CATALOG_LOG_FORMAT` and `CATALOG_LOG_DIR`
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            let format: ConsoleFormat = raw.parse().map_err(|_| LoggingError::InvalidSetting {
                variable: ENV_LOG_FORMAT,
                value: raw.clone(),
            })?;
            config.console.format = format;
            config.console.ansi = format == ConsoleFormat::Pretty;
        }

        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|dir| !dir.trim().is_empty()) {
            config.file = Some(FileConfig {
                directory: PathBuf::from(dir),
                ..Default::default()
            });
        }

        Ok(config)
    }

    /// `EnvFilter` directives for this config
    ///
    /// The default level comes first, component levels after it, so the
    /// component levels win for their own targets.
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![self.default_level.clone()];
        if let Some(level) = &self.resolver_level {
            directives.push(format!("{RESOLVER_TARGET}={level}"));
        }
        if let Some(level) = &self.storage_level {
            directives.push(format!("{STORAGE_TARGET}={level}"));
        }
        directives.join(",")
    }
}

/// Console output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: ConsoleFormat,
    /// Include ANSI colors (pretty format only)
    pub ansi: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: ConsoleFormat::Json,
            ansi: false,
        }
    }
}

/// Line format for console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable multi-line output
    Pretty,
}

impl fmt::Display for ConsoleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleFormat::Json => write!(f, "json"),
            ConsoleFormat::Pretty => write!(f, "pretty"),
        }
    }
}

impl FromStr for ConsoleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "jsonl" => Ok(ConsoleFormat::Json),
            "pretty" => Ok(ConsoleFormat::Pretty),
            other => Err(format!("unknown console format: {other}")),
        }
    }
}

/// File output configuration
///
/// File output is always JSONL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub directory: PathBuf,
    /// File name prefix; files are named `<prefix>.log` or `<prefix>.<date>.log`
    pub prefix: String,
    pub rotation: RotationStrategy,
    /// Maximum rotated files to retain
    pub max_files: Option<usize>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            prefix: "catalog".to_string(),
            rotation: RotationStrategy::Daily,
            max_files: Some(7),
        }
    }
}

/// File rotation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RotationStrategy {
    #[default]
    Daily,
    Hourly,
    /// Single file, truncated on start
    Never,
}

impl RotationStrategy {
    /// The appender rotation, or `None` for a single truncated file
    pub(crate) fn rotation(self) -> Option<Rotation> {
        match self {
            RotationStrategy::Daily => Some(Rotation::DAILY),
            RotationStrategy::Hourly => Some(Rotation::HOURLY),
            RotationStrategy::Never => None,
        }
    }
}

/// Extra fields written into JSON lines
///
/// Event fields are always flattened into the top-level object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFields {
    /// The innermost span and its fields (`participant`, `call_id`, `range`)
    pub current_span: bool,
    /// Every span from the root to the event
    pub span_list: bool,
    pub source_location: bool,
    pub thread: bool,
}

impl Default for JsonFields {
    fn default() -> Self {
        Self {
            current_span: true,
            span_list: true,
            source_location: false,
            thread: false,
        }
    }
}
