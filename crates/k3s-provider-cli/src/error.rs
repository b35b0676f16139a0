//! Error types for the CLI

use std::path::PathBuf;

use k3s_provider_common::telemetry::TelemetryError;

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Render(#[from] k3s_provider_common::Error),

    #[error("logging setup failed: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("invalid descriptor {source_name}: {message}")]
    InvalidDescriptor {
        source_name: String,
        message: String,
    },

    #[error("failed to write {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    #[error("command failed: {message}")]
    CommandFailed { message: String },
}

impl Error {
    pub fn invalid_descriptor(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidDescriptor {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn write_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::WriteFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn command_failed(message: impl Into<String>) -> Self {
        Error::CommandFailed {
            message: message.into(),
        }
    }
}
