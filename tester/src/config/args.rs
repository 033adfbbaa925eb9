//! Command-line arguments for the `ldap-test` binary
//!
//! Every setting flag is optional; only flags actually given override the
//! config file. Boolean flags accept `--flag` or `--flag=false`.

use clap::Parser;
use shared::LogLevel;
use std::path::PathBuf;

use super::{Config, DEFAULT_CONFIG_PATH, ReportFormat};
use crate::suites::SuiteSelection;

/// Exercises the core LDAP operations against a live directory server
#[derive(Parser, Debug, Default)]
#[command(name = "ldap-test")]
#[command(about = "LDAP operations conformance test suite")]
#[command(disable_version_flag = true)]
pub struct Args {
    /// Config file path
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// LDAP server host
    #[arg(long, env = "LDAP_HOST")]
    pub host: Option<String>,

    /// LDAP server port
    #[arg(long)]
    pub port: Option<u32>,

    /// Bind DN for authentication
    #[arg(long, env = "LDAP_BIND_DN")]
    pub bind_dn: Option<String>,

    /// Bind password
    #[arg(long, env = "LDAP_BIND_PASSWORD", hide_env_values = true)]
    pub bind_password: Option<String>,

    /// Base DN for test operations
    #[arg(long)]
    pub base_dn: Option<String>,

    /// Use LDAPS (LDAP over TLS)
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub use_tls: Option<bool>,

    /// Use StartTLS
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub start_tls: Option<bool>,

    /// Skip certificate verification (not for production)
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub insecure_skip_verify: Option<bool>,

    /// Connection and operation timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Prefix for test entries
    #[arg(long)]
    pub test_prefix: Option<String>,

    /// Test suite to run
    #[arg(long, value_enum)]
    pub test_suite: Option<SuiteSelection>,

    /// Number of concurrent test workers (accepted, runs are sequential)
    #[arg(long)]
    pub concurrent: Option<u32>,

    /// Preview operations without executing
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub dry_run: Option<bool>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Log file path (default: ./logs/ldap-test-{timestamp}.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (sets log level to trace)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Delete test data after the run
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub cleanup: Option<bool>,

    /// Delete test data only if all tests pass
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub cleanup_on_success: Option<bool>,

    /// List existing test data and exit
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub list_test_data: Option<bool>,

    /// Delete test data older than a duration (e.g. 7d, 24h) and exit
    #[arg(long)]
    pub cleanup_older_than: Option<String>,

    /// Report output format
    #[arg(long, value_enum)]
    pub report_format: Option<ReportFormat>,

    /// Repeat the test run until the count is reached or interrupted
    #[arg(long = "loop", num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub loop_mode: Option<bool>,

    /// Iterations in loop mode (0 = until interrupted)
    #[arg(long)]
    pub loop_count: Option<u32>,

    /// Seconds to wait between loop iterations
    #[arg(long)]
    pub loop_delay: Option<u64>,

    /// Show version information
    #[arg(long)]
    pub version: bool,
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl Args {
    /// Override config values with the flags that were given
    pub fn apply(self, config: &mut Config) {
        set(&mut config.host, self.host);
        set(&mut config.port, self.port);
        set(&mut config.bind_dn, self.bind_dn);
        set(&mut config.bind_password, self.bind_password);
        set(&mut config.base_dn, self.base_dn);
        set(&mut config.use_tls, self.use_tls);
        set(&mut config.start_tls, self.start_tls);
        set(&mut config.insecure_skip_verify, self.insecure_skip_verify);
        set(&mut config.timeout, self.timeout);
        set(&mut config.test_prefix, self.test_prefix);
        set(&mut config.test_suite, self.test_suite);
        set(&mut config.concurrent, self.concurrent);
        set(&mut config.dry_run, self.dry_run);
        set(&mut config.log_level, self.log_level);
        set(&mut config.log_file, self.log_file);
        set(&mut config.cleanup, self.cleanup);
        set(&mut config.cleanup_on_success, self.cleanup_on_success);
        set(&mut config.list_test_data, self.list_test_data);
        set(&mut config.report_format, self.report_format);
        set(&mut config.loop_mode, self.loop_mode);
        set(&mut config.loop_count, self.loop_count);
        set(&mut config.loop_delay, self.loop_delay);

        if self.cleanup_older_than.is_some() {
            config.cleanup_older_than = self.cleanup_older_than;
        }
        if self.verbose {
            config.verbose = true;
        }
    }
}
