//! LDAP conformance test harness
//!
//! Connects to a live directory server, creates a timestamped test root
//! under the configured base DN and runs per-operation suites against it
//! (bind, add, search, compare, modify, modify DN, delete, abandon/unbind).
//! Every entry the suites create is recorded so it can be removed afterwards.
//!
//! ```no_run
//! use std::sync::Arc;
//! use directory::LdapConnector;
//! use ldap_tester::{Config, InterruptFlag, Runner};
//!
//! # async fn example() -> ldap_tester::TesterResult<()> {
//! let config = Config::load_from_file("./configs/ldap-test-config.yaml")?;
//! let connector = LdapConnector::new(config.connection_settings()?);
//! let mut runner = Runner::new(config, Arc::new(connector));
//! runner.run(&InterruptFlag::new()).await?;
//! std::process::exit(runner.exit_code());
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod report;
pub mod runtime;
pub mod suites;

pub use config::{Args, Config, ReportFormat};
pub use crate::core::{CleanupReport, EntryKind, LoopStatistics, TestOutcome, TestSuiteRun, TrackedEntry, Tracker};
pub use error::{ConfigError, ConfigResult, TesterError, TesterResult};
pub use runtime::{InterruptFlag, Runner, RunnerPhase, SUITE_NAME, spawn_listener};
pub use suites::{Credentials, SuiteContext, SuiteSelection};
