//! Structured logging for the catalog resolver
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines for log aggregation (default)
//! - **Participant Context**: Attribute spans to the participant a catalog is served for
//! - **File Rotation**: Daily/hourly log rotation via tracing-appender
//!
//! # Quick Start
//!
//! ```ignore
//! use catalog_logging::{CatalogSubscriberBuilder, LogConfig};
//!
//! // JSONL to console
//! CatalogSubscriberBuilder::new().init();
//!
//! // Pretty human-readable output
//! CatalogSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//! ```
//!
//! # Participant Context
//!
//! The resolver records `participant` and `call_id` on its `catalog_query`
//! span. [`ParticipantContextLayer`] lifts them into span extensions, and
//! [`participant_of`] reads them back from any descendant span:
//!
//! ```ignore
//! fn on_new_span(&self, _attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
//!     if let Some(data) = ctx.span(id).and_then(|span| participant_of(&span)) {
//!         // data.participant_id, data.call_id
//!     }
//! }
//! ```

pub mod config;
pub mod context;
pub mod layers;

pub use config::{
    ConsoleConfig, ConsoleFormat, ENV_LOG_DIR, ENV_LOG_FORMAT, FileConfig, JsonFields, LogConfig,
    RotationStrategy,
};
pub use context::{ParticipantContextData, fields};
pub use layers::{ParticipantContextExtension, ParticipantContextLayer, participant_of};

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};
use tracing_subscriber::util::TryInitError;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to create rolling log appender: {0}")]
    Appender(#[from] InitError),

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(#[from] TryInitError),

    #[error("Invalid value {value:?} for {variable}")]
    InvalidSetting {
        variable: &'static str,
        value: String,
    },
}

/// Builder for configuring and initializing the logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::development()`
/// for human-readable pretty output during development.
pub struct CatalogSubscriberBuilder {
    config: LogConfig,
}

impl CatalogSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// Initialize the subscriber globally
    ///
    /// Returns a guard that must be kept alive for as long as file output
    /// should be flushed. Failures are reported on stderr.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: Failed to initialize logging: {}", e);
                None
            }
        }
    }

    /// Try to initialize the subscriber globally
    ///
    /// Fails if the log file cannot be opened or a global subscriber has
    /// already been set.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.filter_directives()));

        let console = &self.config.console;
        let json = &self.config.json;

        let pretty_console = (console.enabled && console.format == ConsoleFormat::Pretty).then(|| {
            tracing_subscriber::fmt::layer()
                .with_ansi(console.ansi)
                .with_target(true)
        });

        let json_console = (console.enabled && console.format == ConsoleFormat::Json).then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(json.current_span)
                .with_span_list(json.span_list)
                .with_file(json.source_location)
                .with_line_number(json.source_location)
                .with_thread_ids(json.thread)
                .with_thread_names(json.thread)
        });

        let (file_layer, guard) = match &self.config.file {
            Some(file_config) => {
                let (writer, guard) = file_writer(file_config)?;
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .flatten_event(true)
                    .with_current_span(json.current_span)
                    .with_span_list(json.span_list)
                    .with_file(json.source_location)
                    .with_line_number(json.source_location)
                    .with_thread_ids(json.thread)
                    .with_thread_names(json.thread)
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        Registry::default()
            .with(env_filter)
            .with(ParticipantContextLayer::new())
            .with(pretty_console)
            .with(json_console)
            .with(file_layer)
            .try_init()?;

        Ok(guard)
    }
}

impl Default for CatalogSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the non-blocking writer for file output
///
/// `Never` truncates a single file, the other strategies append to rolling files.
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let Some(rotation) = config.rotation.rotation() else {
        fs::create_dir_all(&config.directory)?;
        let file = File::create(config.directory.join(format!("{}.log", config.prefix)))?;
        return Ok(tracing_appender::non_blocking(file));
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&config.prefix)
        .filename_suffix("log");
    if let Some(max_files) = config.max_files {
        builder = builder.max_log_files(max_files);
    }
    let appender = builder.build(&config.directory)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging from `CATALOG_LOG_FORMAT` and `CATALOG_LOG_DIR`
///
/// Without either variable this is JSONL on the console. Returns the file
/// writer's guard when `CATALOG_LOG_DIR` enables file output.
pub fn init_default() -> Option<WorkerGuard> {
    let config = LogConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Warning: {}, using default logging", e);
        LogConfig::default()
    });
    CatalogSubscriberBuilder::new().with_config(config).init()
}

/// Initialize logging for development (verbose, pretty console output)
pub fn init_development() {
    CatalogSubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init();
}

/// Initialize logging for testing (minimal output)
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_testing() {
    let _ = CatalogSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}
