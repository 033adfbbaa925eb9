//! Report rendering for a finished run

pub mod console;
pub mod json;
pub mod junit;

use crate::config::ReportFormat;
use crate::core::{TestSuiteRun, TrackedEntry};
use crate::error::TesterResult;

/// Render `run` in `format`; `preserved` lists entries left in the directory
pub fn render(format: ReportFormat, run: &TestSuiteRun, preserved: &[TrackedEntry]) -> TesterResult<String> {
    match format {
        ReportFormat::Console => Ok(console::render_run(run, preserved)),
        ReportFormat::Json => json::render(run, preserved),
        ReportFormat::Xml => junit::render(run),
    }
}
