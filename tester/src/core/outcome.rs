//! Scenario outcomes and the aggregates built from them

use chrono::{DateTime, Utc};
use directory::{DirectoryError, ResultCode};
use serde::Serialize;
use shared::OperationKind;
use std::time::{Duration, Instant};

/// Error captured from the directory while running a scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub code: Option<ResultCode>,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

impl From<&DirectoryError> for ErrorDetail {
    fn from(err: &DirectoryError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Result of one scenario; never changes once built
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    pub name: String,
    pub operation: OperationKind,
    pub passed: bool,
    pub elapsed: Duration,
    pub error: Option<ErrorDetail>,
    pub message: String,
}

/// A delete that failed during cleanup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupFailure {
    pub dn: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupReport {
    pub attempted: usize,
    pub deleted: usize,
    /// Entries already gone from the directory, typically pre-rename names
    pub absent: usize,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

/// Outcomes of one run of the selected suites
#[derive(Debug, Clone)]
pub struct TestSuiteRun {
    pub name: String,
    pub results: Vec<TestOutcome>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub test_root: Option<String>,
    pub cleanup: Option<CleanupReport>,
    /// Fatal-setup error that ended the run early
    pub aborted: Option<String>,
    started: Instant,
    duration: Option<Duration>,
}

impl TestSuiteRun {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
            test_root: None,
            cleanup: None,
            aborted: None,
            started: Instant::now(),
            duration: None,
        }
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = TestOutcome>) {
        self.results.extend(outcomes);
    }

    pub fn finish(&mut self) {
        if self.ended_at.is_none() {
            self.ended_at = Some(Utc::now());
            self.duration = Some(self.started.elapsed());
        }
    }

    pub fn abort(&mut self, reason: impl Into<String>) {
        self.aborted = Some(reason.into());
        self.finish();
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    /// Wall-clock time of the run; measured up to now while it is in progress
    pub fn duration(&self) -> Duration {
        self.duration.unwrap_or_else(|| self.started.elapsed())
    }

    pub fn stats(&self) -> RunStats {
        let passed = self.results.iter().filter(|r| r.passed).count();
        RunStats {
            total: self.results.len(),
            passed,
            failed: self.results.len() - passed,
            duration: self.duration(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestOutcome> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// Counters accumulated across loop iterations for the life of the process
#[derive(Debug, Clone)]
pub struct LoopStatistics {
    pub total_runs: usize,
    pub successful_runs: usize,
    pub failed_runs: usize,
    pub total_tests: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub total_duration: Duration,
    pub cleanup_failures: usize,
    started: Instant,
}

impl Default for LoopStatistics {
    fn default() -> Self {
        Self {
            total_runs: 0,
            successful_runs: 0,
            failed_runs: 0,
            total_tests: 0,
            total_passed: 0,
            total_failed: 0,
            total_duration: Duration::ZERO,
            cleanup_failures: 0,
            started: Instant::now(),
        }
    }
}

impl LoopStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a completed iteration into the totals
    pub fn record(&mut self, run: &TestSuiteRun) {
        let stats = run.stats();
        self.total_runs += 1;
        if run.is_aborted() {
            self.failed_runs += 1;
        } else {
            self.successful_runs += 1;
        }
        self.total_tests += stats.total;
        self.total_passed += stats.passed;
        self.total_failed += stats.failed;
        self.total_duration += stats.duration;
        self.cleanup_failures += run.cleanup.as_ref().map_or(0, CleanupReport::failed);
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn run_success_rate(&self) -> f64 {
        percentage(self.successful_runs, self.total_runs)
    }

    pub fn run_failure_rate(&self) -> f64 {
        percentage(self.failed_runs, self.total_runs)
    }

    pub fn pass_rate(&self) -> f64 {
        percentage(self.total_passed, self.total_tests)
    }

    pub fn fail_rate(&self) -> f64 {
        percentage(self.total_failed, self.total_tests)
    }

    pub fn average_per_run(&self) -> Duration {
        average(self.total_duration, self.total_runs)
    }

    pub fn average_per_test(&self) -> Duration {
        average(self.total_duration, self.total_tests)
    }
}

/// Percentage in 0..=100; zero when there is nothing to divide by
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn average(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) | Err(_) => Duration::ZERO,
        Ok(n) => total / n,
    }
}
