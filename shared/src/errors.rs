//! Shared error types for the LDAP conformance workspace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid log level: {input} (must be error, warn, info, debug, or trace)")]
    InvalidLogLevel { input: String },

    #[error("Failed to create log directory {path}: {source}")]
    LogDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging already initialised: {message}")]
    SubscriberInit { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
