//! Logging initialization
//!
//! Sets up a `tracing` subscriber with:
//! - an `EnvFilter` (`RUST_LOG` wins over the configured default)
//! - a stderr layer in text or JSON form
//! - an optional append-only log file written through a non-blocking
//!   `tracing-appender` writer
//!
//! stdout is left alone so the CLI can print rendered documents there.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log file or its directory could not be prepared
    #[error("failed to prepare log file {path}: {message}")]
    LogFile {
        /// Path of the requested log file
        path: PathBuf,
        /// Description of what failed
        message: String,
    },

    /// Failed to initialize tracing subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Output format for log events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line events
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected text or json")),
        }
    }
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Format for the stderr layer
    pub format: LogFormat,
    /// Optional file that receives every event as JSON
    pub log_file: Option<PathBuf>,
    /// Filter directive used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            log_file: None,
            default_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Initialize the global subscriber.
///
/// When a log file is configured the returned guard must be kept alive for
/// the life of the process, otherwise buffered events are lost.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>, TelemetryError> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    match config.format {
        LogFormat::Text => layers.push(
            stderr_layer
                .with_filter(env_filter(&config.default_filter))
                .boxed(),
        ),
        LogFormat::Json => layers.push(
            stderr_layer
                .json()
                .with_filter(env_filter(&config.default_filter))
                .boxed(),
        ),
    }

    let guard = match &config.log_file {
        Some(path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir).map_err(|e| TelemetryError::LogFile {
                path: path.clone(),
                message: e.to_string(),
            })?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .json()
                    .with_filter(env_filter(&config.default_filter))
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    Ok(guard)
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Split a log file path into the directory to create and the file name.
fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), TelemetryError> {
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| TelemetryError::LogFile {
            path: path.to_path_buf(),
            message: "path has no file name".to_string(),
        })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_default_config_logs_to_stderr_only() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Text);
        assert!(config.log_file.is_none());
        assert_eq!(config.default_filter, "info");
    }

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("/var/log/k3s-provider.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log"));
        assert_eq!(name, PathBuf::from("k3s-provider.log"));

        let (dir, name) = split_log_path(Path::new("provider.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, PathBuf::from("provider.log"));
    }

    #[test]
    fn test_split_log_path_requires_file_name() {
        let err = split_log_path(Path::new("/")).unwrap_err();
        assert!(matches!(err, TelemetryError::LogFile { .. }));
    }

    #[test]
    fn test_log_file_directory_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/dir/provider.log");
        let config = LoggingConfig {
            log_file: Some(path.clone()),
            ..Default::default()
        };

        // A global subscriber may already be installed by another test; the
        // directory must exist either way.
        let _ = init_logging(config);
        assert!(path.parent().unwrap().is_dir());
    }
}
