//! Core bookkeeping: entry ledger, outcomes, scenario classification

pub mod outcome;
pub mod scenario;
pub mod tracker;

pub use outcome::{
    CleanupFailure, CleanupReport, ErrorDetail, LoopStatistics, RunStats, TestOutcome, TestSuiteRun, percentage,
};
pub use scenario::{Rejection, Scenario, classify_negative, classify_positive};
pub use tracker::{EntryKind, TrackedEntry, Tracker, summarize_entries};
