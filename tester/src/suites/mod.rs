//! Per-operation test suites
//!
//! Each suite is an ordered list of scenarios run against the live
//! connection. Suites only ever write to the [`Tracker`]; later suites find
//! the entries created by earlier ones by literal name under the test root,
//! which is why [`SuiteSelection::operations`] has a fixed order.

pub mod abandon;
pub mod add;
pub mod bind;
pub mod compare;
pub mod delete;
pub mod modify;
pub mod modifydn;
pub mod search;

#[cfg(test)]
pub(crate) mod tests_support;

use clap::ValueEnum;
use directory::{Connector, DirectoryHandle, DirectoryResult};
use serde::{Deserialize, Serialize};
use shared::{Component, OperationKind, component_info, component_warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{EntryKind, TestOutcome, Tracker};

/// Entries every suite after Add relies on
pub const TEST_USER_CN: &str = "testuser";

/// How long the abandon scenario waits for its background search
pub const DEFAULT_ABANDON_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SuiteSelection {
    #[default]
    All,
    Bind,
    Search,
    Add,
    Modify,
    Compare,
    Modifydn,
    Delete,
    Abandon,
}

impl SuiteSelection {
    /// Suites to run, in dependency order
    pub fn operations(&self) -> Vec<OperationKind> {
        match self {
            SuiteSelection::All => vec![
                OperationKind::Bind,
                OperationKind::Add,
                OperationKind::Search,
                OperationKind::Compare,
                OperationKind::Modify,
                OperationKind::ModifyDn,
                OperationKind::Delete,
                OperationKind::Abandon,
            ],
            SuiteSelection::Bind => vec![OperationKind::Bind],
            SuiteSelection::Search => vec![OperationKind::Search],
            SuiteSelection::Add => vec![OperationKind::Add],
            SuiteSelection::Modify => vec![OperationKind::Modify],
            SuiteSelection::Compare => vec![OperationKind::Compare],
            SuiteSelection::Modifydn => vec![OperationKind::ModifyDn],
            SuiteSelection::Delete => vec![OperationKind::Delete],
            SuiteSelection::Abandon => vec![OperationKind::Abandon],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteSelection::All => "all",
            SuiteSelection::Bind => "bind",
            SuiteSelection::Search => "search",
            SuiteSelection::Add => "add",
            SuiteSelection::Modify => "modify",
            SuiteSelection::Compare => "compare",
            SuiteSelection::Modifydn => "modifydn",
            SuiteSelection::Delete => "delete",
            SuiteSelection::Abandon => "abandon",
        }
    }
}

impl fmt::Display for SuiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub bind_dn: String,
    pub bind_password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"<redacted>")
            .finish()
    }
}

/// Everything a suite needs for one run
#[derive(Clone)]
pub struct SuiteContext {
    pub directory: DirectoryHandle,
    /// Opens spare connections for scenarios that must not disturb the live one
    pub connector: Arc<dyn Connector>,
    pub credentials: Credentials,
    pub base_dn: String,
    pub test_root: String,
    pub tracker: Arc<Tracker>,
    pub abandon_wait: Duration,
}

impl SuiteContext {
    /// DN of a direct child of the test root
    pub fn child(&self, rdn: &str) -> String {
        format!("{rdn},{}", self.test_root)
    }

    pub fn test_user_dn(&self) -> String {
        self.child(&format!("cn={TEST_USER_CN}"))
    }

    /// Track `dn` after an add or rename unless the server refused it
    ///
    /// Timeouts and transport failures leave the outcome unknown, so the entry
    /// is tracked anyway; cleanup counts it as absent if it never appeared.
    pub fn track_unless_refused<T>(&self, result: &DirectoryResult<T>, dn: &str, kind: EntryKind) {
        match result {
            Ok(_) => self.tracker.track(dn.to_string(), kind),
            Err(e) if e.is_indeterminate() => {
                component_warn!(Component::Tracker, "Outcome unknown for {dn}, tracking it for cleanup: {e}");
                self.tracker.track(dn.to_string(), kind);
            }
            Err(_) => {}
        }
    }
}

pub async fn run_suite(operation: OperationKind, ctx: &SuiteContext) -> Vec<TestOutcome> {
    let component = Component::Suite(operation);
    component_info!(component, "Starting {operation} operation tests");

    let results = match operation {
        OperationKind::Bind => bind::run(ctx).await,
        OperationKind::Add => add::run(ctx).await,
        OperationKind::Search => search::run(ctx).await,
        OperationKind::Compare => compare::run(ctx).await,
        OperationKind::Modify => modify::run(ctx).await,
        OperationKind::ModifyDn => modifydn::run(ctx).await,
        OperationKind::Delete => delete::run(ctx).await,
        OperationKind::Abandon | OperationKind::Unbind => abandon::run(ctx).await,
    };

    component_info!(component, total = results.len(), "Completed {operation} operation tests");
    results
}

/// Run every suite of a selection in order
pub async fn run_selected(selection: SuiteSelection, ctx: &SuiteContext) -> Vec<TestOutcome> {
    let mut results = Vec::new();
    for operation in selection.operations() {
        results.extend(run_suite(operation, ctx).await);
    }
    results
}
