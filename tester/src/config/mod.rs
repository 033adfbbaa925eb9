//! Configuration Management
//!
//! A YAML file supplies the base configuration and command-line flags
//! override it (see [`args::Args::apply`]). A missing file is not an error.

pub mod args;

pub use args::Args;

use chrono::Local;
use clap::ValueEnum;
use directory::{ConnectionSettings, TlsMode};
use serde::{Deserialize, Serialize};
use shared::LogLevel;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::suites::{Credentials, SuiteSelection};

pub const DEFAULT_CONFIG_PATH: &str = "./configs/ldap-test-config.yaml";

/// Characters with meaning in DNs or search filters
const RESERVED_PREFIX_CHARS: &str = ",=+<>#;\\\"*()";

/// Output format of the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
    Xml,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Console => "console",
            ReportFormat::Json => "json",
            ReportFormat::Xml => "xml",
        })
    }
}

/// Default log file, stamped with the local start time
pub fn default_log_file() -> PathBuf {
    PathBuf::from(format!(
        "./logs/ldap-test-{}.log",
        Local::now().format("%Y-%m-%d-%H-%M-%S")
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Connection
    pub host: String,
    pub port: u32,
    pub bind_dn: String,
    pub bind_password: String,
    pub base_dn: String,
    pub use_tls: bool,
    pub start_tls: bool,
    /// Seconds, applied to connect and to every operation
    pub timeout: u64,
    pub insecure_skip_verify: bool,

    // Test selection
    pub test_prefix: String,
    pub concurrent: u32,
    pub test_suite: SuiteSelection,
    pub dry_run: bool,

    // Logging
    pub log_level: LogLevel,
    pub log_file: PathBuf,
    pub verbose: bool,

    // Cleanup and retention
    pub cleanup: bool,
    pub cleanup_on_success: bool,
    pub list_test_data: bool,
    pub cleanup_older_than: Option<String>,

    pub report_format: ReportFormat,

    // Loop mode
    #[serde(rename = "loop")]
    pub loop_mode: bool,
    /// 0 runs until interrupted
    pub loop_count: u32,
    /// Seconds between iterations
    pub loop_delay: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 389,
            bind_dn: String::new(),
            bind_password: String::new(),
            base_dn: String::new(),
            use_tls: false,
            start_tls: false,
            timeout: 30,
            insecure_skip_verify: false,
            test_prefix: "ldap-test".to_string(),
            concurrent: 1,
            test_suite: SuiteSelection::All,
            dry_run: false,
            log_level: LogLevel::Info,
            log_file: default_log_file(),
            verbose: false,
            cleanup: false,
            cleanup_on_success: false,
            list_test_data: false,
            cleanup_older_than: None,
            report_format: ReportFormat::Console,
            loop_mode: false,
            loop_count: 0,
            loop_delay: 0,
        }
    }
}

impl Config {
    /// Load from YAML; a file that does not exist yields the defaults
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        // An empty document deserializes to null, which serde(default) does not cover
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.is_empty() {
            return Err(ConfigError::invalid("host is required"));
        }
        if self.port == 0 || self.port > 65535 {
            return Err(ConfigError::invalid("port must be between 1 and 65535"));
        }
        if self.bind_dn.is_empty() {
            return Err(ConfigError::invalid("bind DN is required"));
        }
        if self.bind_password.is_empty() {
            return Err(ConfigError::invalid("bind password is required"));
        }
        if self.base_dn.is_empty() {
            return Err(ConfigError::invalid("base DN is required"));
        }
        if self.use_tls && self.start_tls {
            return Err(ConfigError::invalid("cannot use both TLS and StartTLS"));
        }
        if self.test_prefix.is_empty() {
            return Err(ConfigError::invalid("test prefix must not be empty"));
        }
        // The prefix becomes an RDN value and a filter substring
        if let Some(c) = self.test_prefix.chars().find(|c| RESERVED_PREFIX_CHARS.contains(*c)) {
            return Err(ConfigError::invalid(format!("test prefix must not contain '{c}'")));
        }
        self.cleanup_age()?;
        Ok(())
    }

    pub fn tls_mode(&self) -> TlsMode {
        match (self.use_tls, self.start_tls) {
            (true, _) => TlsMode::Ldaps,
            (false, true) => TlsMode::StartTls,
            (false, false) => TlsMode::Plain,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn loop_delay(&self) -> Duration {
        Duration::from_secs(self.loop_delay)
    }

    /// Settings for the directory connector; call after [`Config::validate`]
    pub fn connection_settings(&self) -> ConfigResult<ConnectionSettings> {
        let port = u16::try_from(self.port)
            .map_err(|_| ConfigError::invalid("port must be between 1 and 65535"))?;
        Ok(ConnectionSettings {
            host: self.host.clone(),
            port,
            tls: self.tls_mode(),
            timeout: self.timeout(),
            insecure_skip_verify: self.insecure_skip_verify,
        })
    }

    /// Server URL as shown in logs
    pub fn address(&self) -> String {
        let scheme = if self.use_tls { "ldaps" } else { "ldap" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            bind_dn: self.bind_dn.clone(),
            bind_password: self.bind_password.clone(),
        }
    }

    /// Retention age from `cleanup_older_than`, e.g. `7d` or `24h`
    pub fn cleanup_age(&self) -> ConfigResult<Option<Duration>> {
        match self.cleanup_older_than.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => humantime::parse_duration(text).map(Some).map_err(|e| {
                ConfigError::invalid(format!("invalid cleanup-older-than duration '{text}': {e}"))
            }),
        }
    }

    /// Effective log level; verbose forces trace
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose { LogLevel::Trace } else { self.log_level }
    }

    /// Whether cleanup should run for a run with the given verdict
    pub fn should_cleanup(&self, all_passed: bool) -> bool {
        self.cleanup || (self.cleanup_on_success && all_passed)
    }
}
