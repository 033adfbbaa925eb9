//! Machine readable JSON report

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{CleanupReport, ErrorDetail, TestOutcome, TestSuiteRun, TrackedEntry};
use crate::error::TesterResult;

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub name: &'a str,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub all_passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_root: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<&'a str>,
    pub results: Vec<JsonOutcome<'a>>,
    pub cleanup: Option<&'a CleanupReport>,
    pub preserved_entries: &'a [TrackedEntry],
}

#[derive(Debug, Serialize)]
pub struct JsonOutcome<'a> {
    pub name: &'a str,
    pub operation: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a ErrorDetail>,
}

impl<'a> From<&'a TestOutcome> for JsonOutcome<'a> {
    fn from(outcome: &'a TestOutcome) -> Self {
        Self {
            name: &outcome.name,
            operation: outcome.operation.to_string(),
            passed: outcome.passed,
            duration_ms: outcome.elapsed.as_millis() as u64,
            message: &outcome.message,
            error: outcome.error.as_ref(),
        }
    }
}

impl<'a> JsonReport<'a> {
    pub fn new(run: &'a TestSuiteRun, preserved: &'a [TrackedEntry]) -> Self {
        let stats = run.stats();
        Self {
            name: &run.name,
            started_at: run.started_at,
            ended_at: run.ended_at,
            duration_ms: stats.duration.as_millis() as u64,
            total: stats.total,
            passed: stats.passed,
            failed: stats.failed,
            all_passed: !run.is_aborted() && run.all_passed(),
            test_root: run.test_root.as_deref(),
            aborted: run.aborted.as_deref(),
            results: run.results.iter().map(JsonOutcome::from).collect(),
            cleanup: run.cleanup.as_ref(),
            preserved_entries: preserved,
        }
    }
}

pub fn render(run: &TestSuiteRun, preserved: &[TrackedEntry]) -> TesterResult<String> {
    let mut text = serde_json::to_string_pretty(&JsonReport::new(run, preserved))?;
    text.push('\n');
    Ok(text)
}
