//! Directory capability error types

use crate::result_code::ResultCode;
use shared::OperationKind;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    #[error("Failed to connect to {address}: {message}")]
    Connect { address: String, message: String },

    #[error("{operation} rejected by server: {code}{}", detail(.message))]
    Server {
        operation: OperationKind,
        code: ResultCode,
        message: String,
    },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: OperationKind, timeout: Duration },

    #[error("{operation} transport failure: {message}")]
    Transport { operation: OperationKind, message: String },
}

fn detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(" - {message}")
    }
}

impl DirectoryError {
    pub fn server(operation: OperationKind, code: ResultCode, message: impl Into<String>) -> Self {
        DirectoryError::Server {
            operation,
            code,
            message: message.into(),
        }
    }

    /// Server result code, when the failure came from an LDAP response
    pub fn code(&self) -> Option<ResultCode> {
        match self {
            DirectoryError::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn has_code(&self, expected: ResultCode) -> bool {
        self.code() == Some(expected)
    }

    /// No server verdict arrived, so the request may or may not have been applied
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, DirectoryError::Timeout { .. } | DirectoryError::Transport { .. })
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;
