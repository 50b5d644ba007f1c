//! `tracing` subscriber setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// Standard error
    #[default]
    Stderr,
    /// Append to a file
    File(PathBuf),
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it
    pub level: String,
    /// Line format
    pub format: LogFormat,
    /// Destination
    pub output: LogOutput,
    /// Include the event target
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            output: LogOutput::Stderr,
            with_target: false,
        }
    }
}

impl LoggingConfig {
    /// Create a configuration with a default filter
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Set the line format
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Append to a file instead of stderr
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Include event targets
    #[must_use]
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Filter from `RUST_LOG`, falling back to the configured level
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file could not be opened
    #[error("Failed to open log file {path}: {source}")]
    File {
        /// Log file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// A global subscriber is already installed
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

/// Keeps the file writer thread alive
///
/// Buffered lines are flushed when the guard is dropped, so hold it until the
/// process exits.
#[derive(Debug)]
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn format_layer(
    config: &LoggingConfig,
) -> Result<(BoxedLayer, Option<WorkerGuard>), LoggingError> {
    let layer = fmt::layer().with_target(config.with_target);
    let mut guard = None;

    let layer: BoxedLayer = match (&config.output, config.format) {
        (LogOutput::Stderr, LogFormat::Text) => layer.with_writer(std::io::stderr).boxed(),
        (LogOutput::Stderr, LogFormat::Json) => {
            layer.json().with_writer(std::io::stderr).boxed()
        }
        (LogOutput::File(path), format) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| LoggingError::File {
                    path: path.clone(),
                    source,
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::File {
                    path: path.clone(),
                    source,
                })?;
            let (writer, file_guard) = tracing_appender::non_blocking(file);
            guard = Some(file_guard);
            match format {
                LogFormat::Text => layer.with_ansi(false).with_writer(writer).boxed(),
                LogFormat::Json => layer.json().with_writer(writer).boxed(),
            }
        }
    };

    Ok((layer, guard))
}

/// Install the global subscriber
///
/// # Errors
/// Returns error if the log file cannot be opened or a subscriber is already
/// installed
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard, LoggingError> {
    let filter = config.filter();
    let (layer, file) = format_layer(config)?;

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    info!(
        level = %config.level,
        format = ?config.format,
        output = ?config.output,
        "Logging initialized"
    );
    Ok(LogGuard { _file: file })
}
