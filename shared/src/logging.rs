//! Shared logging utilities for consistent tracing across the workspace
//!
//! Every log line emitted through the `component_*` macros carries a
//! `component` field, so console and file output can be filtered by the part
//! of the harness that produced it.

use crate::errors::{SharedError, SharedResult};
use crate::types::{Component, OperationKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

pub use tracing;

/// Log verbosity accepted on the command line and in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(SharedError::InvalidLogLevel { input: s.to_string() }),
        }
    }
}

/// Filter directive covering the workspace crates at the given level
pub fn filter_directive(level: LogLevel) -> String {
    format!("ldap_tester={level},directory={level},shared={level},ldap3=warn")
}

/// Initialize tracing with console output and an optional log file
///
/// The file layer never uses ANSI colours. Parent directories of the log file
/// are created when missing.
pub fn init_tracing(level: LogLevel, log_file: Option<&Path>) -> SharedResult<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let env_filter = EnvFilter::new(filter_directive(level));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let file_layer = match log_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SharedError::SubscriberInit { message: e.to_string() })
}

/// Open (append) the log file, creating its directory first
pub fn open_log_file(path: &Path) -> SharedResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SharedError::LogDirectory {
            path: parent.display().to_string(),
            source,
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SharedError::LogFile {
            path: path.display().to_string(),
            source,
        })
}

/// Macro for component-aware error logging
#[macro_export]
macro_rules! component_error {
    ($component:expr, $($arg:tt)*) => {
        $crate::logging::tracing::error!(component = %$component, $($arg)*)
    };
}

/// Macro for component-aware warning logging
#[macro_export]
macro_rules! component_warn {
    ($component:expr, $($arg:tt)*) => {
        $crate::logging::tracing::warn!(component = %$component, $($arg)*)
    };
}

/// Macro for component-aware info logging
#[macro_export]
macro_rules! component_info {
    ($component:expr, $($arg:tt)*) => {
        $crate::logging::tracing::info!(component = %$component, $($arg)*)
    };
}

/// Macro for component-aware debug logging
#[macro_export]
macro_rules! component_debug {
    ($component:expr, $($arg:tt)*) => {
        $crate::logging::tracing::debug!(component = %$component, $($arg)*)
    };
}

/// Macro for component-aware trace logging
#[macro_export]
macro_rules! component_trace {
    ($component:expr, $($arg:tt)*) => {
        $crate::logging::tracing::trace!(component = %$component, $($arg)*)
    };
}

/// Record the outcome and latency of a single directory operation
pub fn log_directory_result(
    component: Component,
    operation: OperationKind,
    success: bool,
    code: Option<u32>,
    message: &str,
    duration: Duration,
) {
    let code = code.map(i64::from).unwrap_or(-1);
    let duration_ms = duration.as_millis() as u64;
    if success {
        debug!(component = %component, operation = %operation, code, duration_ms, "✅ {message}");
    } else {
        debug!(component = %component, operation = %operation, code, duration_ms, "❌ {message}");
    }
}

/// Record the parameters of an outgoing search
pub fn log_search_request(component: Component, base: &str, filter: &str, scope: &str, attributes: &[String]) {
    tracing::trace!(
        component = %component,
        base,
        filter,
        scope,
        attributes = ?attributes,
        "🔍 Search request"
    );
}

/// Record how many entries a search produced
pub fn log_search_result(component: Component, entries: usize, duration: Duration) {
    debug!(
        component = %component,
        entries,
        duration_ms = duration.as_millis() as u64,
        "🔍 Search returned {entries} entries"
    );
}

/// Contextual logging helper for startup messages
pub fn log_startup(component: Component, details: &str) {
    info!(component = %component, "🚀 Starting {}", details);
}

/// Contextual logging helper for success conditions
pub fn log_success(component: Component, message: &str) {
    info!(component = %component, "✅ {}", message);
}
