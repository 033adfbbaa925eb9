//! JUnit XML report, one testsuite per operation

use quick_junit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};
use shared::OperationKind;

use crate::core::{TestOutcome, TestSuiteRun};
use crate::error::{TesterError, TesterResult};

fn test_case(outcome: &TestOutcome) -> TestCase {
    let status = if outcome.passed {
        TestCaseStatus::success()
    } else {
        let mut status = TestCaseStatus::non_success(NonSuccessKind::Failure);
        status.set_message(outcome.message.as_str());
        if let Some(error) = &outcome.error {
            status.set_description(error.message.as_str());
            if let Some(code) = error.code {
                status.set_type(code.to_string());
            }
        }
        status
    };

    let mut case = TestCase::new(outcome.name.as_str(), status);
    case.set_classname(format!("ldap.{}", outcome.operation))
        .set_time(outcome.elapsed);
    if outcome.passed && !outcome.message.is_empty() {
        case.set_system_out(outcome.message.as_str());
    }
    case
}

pub fn build(run: &TestSuiteRun) -> Report {
    // Suites appear in the order their operation first ran
    let mut by_operation: Vec<(OperationKind, Vec<&TestOutcome>)> = Vec::new();
    for outcome in &run.results {
        match by_operation.iter_mut().find(|(op, _)| *op == outcome.operation) {
            Some((_, outcomes)) => outcomes.push(outcome),
            None => by_operation.push((outcome.operation, vec![outcome])),
        }
    }

    let mut report = Report::new(run.name.as_str());
    report.set_timestamp(run.started_at).set_time(run.duration());

    for (operation, outcomes) in by_operation {
        let mut suite = TestSuite::new(operation.to_string());
        suite.add_test_cases(outcomes.into_iter().map(test_case));
        report.add_test_suite(suite);
    }

    if let Some(reason) = &run.aborted {
        let mut status = TestCaseStatus::non_success(NonSuccessKind::Error);
        status.set_message(reason.as_str());
        let mut suite = TestSuite::new("Setup");
        suite.add_test_case(TestCase::new("Connect and create test root", status));
        report.add_test_suite(suite);
    }
    report
}

pub fn render(run: &TestSuiteRun) -> TesterResult<String> {
    build(run).to_string().map_err(|e| TesterError::Report {
        format: "xml".to_string(),
        message: e.to_string(),
    })
}
