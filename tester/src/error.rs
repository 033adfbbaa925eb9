//! Tester-specific error types

use directory::DirectoryError;
use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum TesterError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("connection failed: {0}")]
    Connection(#[source] DirectoryError),

    #[error("setup failed: failed to create test base OU {dn}: {source}")]
    Setup {
        dn: String,
        #[source]
        source: DirectoryError,
    },

    #[error("report rendering failed ({format}): {message}")]
    Report { format: String, message: String },

    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TesterResult<T> = Result<T, TesterError>;
