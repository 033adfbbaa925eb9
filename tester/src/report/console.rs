//! Human readable console report

use shared::OperationKind;
use std::fmt::Write as _;
use std::time::Duration;

use crate::core::{LoopStatistics, TestSuiteRun, TrackedEntry, summarize_entries};

const WIDTH: usize = 80;

fn rule(out: &mut String, c: char) {
    out.extend(std::iter::repeat_n(c, WIDTH));
    out.push('\n');
}

fn millis(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis() as u64)
}

fn seconds(duration: Duration) -> Duration {
    Duration::from_secs(duration.as_secs())
}

/// Full report of a single run
pub fn render_run(run: &TestSuiteRun, preserved: &[TrackedEntry]) -> String {
    let stats = run.stats();
    let mut out = String::from("\n");

    rule(&mut out, '=');
    let _ = writeln!(out, "LDAP OPERATIONS TEST SUITE RESULTS");
    rule(&mut out, '=');
    let _ = writeln!(out, "Total Tests:     {}", stats.total);
    let _ = writeln!(out, "Passed:          {}", stats.passed);
    let _ = writeln!(out, "Failed:          {}", stats.failed);
    let _ = writeln!(out, "Duration:        {}", humantime::format_duration(millis(stats.duration)));
    if let Some(root) = &run.test_root {
        let _ = writeln!(out, "Test Root:       {root}");
    }
    if let Some(reason) = &run.aborted {
        let _ = writeln!(out, "Aborted:         {reason}");
    }
    rule(&mut out, '=');

    if !run.results.is_empty() {
        let _ = writeln!(out, "\nDetailed Results:");
        rule(&mut out, '-');

        let mut current: Option<OperationKind> = None;
        for result in &run.results {
            if current != Some(result.operation) {
                let _ = writeln!(out, "\n{} Tests:", result.operation);
                current = Some(result.operation);
            }

            let status = if result.passed { "✓ PASS" } else { "✗ FAIL" };
            let _ = writeln!(
                out,
                "  {status}  {:<50}  {:>6}ms",
                result.name,
                result.elapsed.as_millis()
            );
            if let Some(error) = result.error.as_ref().filter(|_| !result.passed) {
                let _ = writeln!(out, "         Error: {}", error.message);
            }
            if !result.message.is_empty() {
                let _ = writeln!(out, "         {}", result.message);
            }
        }
        out.push('\n');
    }

    match &run.cleanup {
        Some(cleanup) => {
            let _ = writeln!(
                out,
                "Cleanup: {} deleted, {} already absent, {} failed",
                cleanup.deleted,
                cleanup.absent,
                cleanup.failed()
            );
            for failure in &cleanup.failures {
                let _ = writeln!(out, "  ✗ {}: {}", failure.dn, failure.error);
            }
        }
        None => out.push_str(&summarize_entries(preserved)),
    }

    rule(&mut out, '=');
    if run.is_aborted() || !run.all_passed() {
        let _ = writeln!(out, "✗ SOME TESTS FAILED");
    } else {
        let _ = writeln!(out, "✓ ALL TESTS PASSED");
    }
    rule(&mut out, '=');
    out
}

/// Per-iteration line printed in loop mode
pub fn iteration_line(iteration: u32, run: &TestSuiteRun) -> String {
    let stats = run.stats();
    format!(
        "\n[Iteration {iteration}] Tests: {} passed, {} failed ({:.2}s)\n",
        stats.passed,
        stats.failed,
        stats.duration.as_secs_f64()
    )
}

pub fn cumulative_line(stats: &LoopStatistics) -> String {
    format!(
        "[Cumulative] Runs: {}, Success: {}, Failed: {}, Total Tests: {}/{} ({:.1}% pass rate)\n\n",
        stats.total_runs,
        stats.successful_runs,
        stats.failed_runs,
        stats.total_passed,
        stats.total_tests,
        stats.pass_rate()
    )
}

/// Final summary when loop mode ends
pub fn render_loop_summary(stats: &LoopStatistics) -> String {
    let mut out = String::from("\n");
    rule(&mut out, '=');
    let _ = writeln!(out, "LDAP OPERATIONS TEST SUITE - LOOP MODE SUMMARY");
    rule(&mut out, '=');

    let _ = writeln!(out, "Total Runtime:        {}", humantime::format_duration(seconds(stats.elapsed())));
    let _ = writeln!(out, "Total Iterations:     {}", stats.total_runs);
    let _ = writeln!(
        out,
        "Successful Runs:      {} ({:.1}%)",
        stats.successful_runs,
        stats.run_success_rate()
    );
    let _ = writeln!(out, "Failed Runs:          {} ({:.1}%)", stats.failed_runs, stats.run_failure_rate());
    rule(&mut out, '-');
    let _ = writeln!(out, "Total Tests Executed: {}", stats.total_tests);
    let _ = writeln!(out, "Tests Passed:         {} ({:.1}%)", stats.total_passed, stats.pass_rate());
    let _ = writeln!(out, "Tests Failed:         {} ({:.1}%)", stats.total_failed, stats.fail_rate());
    rule(&mut out, '-');
    let _ = writeln!(
        out,
        "Total Test Time:      {}",
        humantime::format_duration(millis(stats.total_duration))
    );
    let _ = writeln!(
        out,
        "Average Per Run:      {}",
        humantime::format_duration(millis(stats.average_per_run()))
    );
    if stats.total_tests > 0 {
        let _ = writeln!(
            out,
            "Average Per Test:     {}",
            humantime::format_duration(millis(stats.average_per_test()))
        );
    }
    rule(&mut out, '=');

    if stats.failed_runs == 0 {
        let _ = writeln!(out, "✓ ALL RUNS COMPLETED SUCCESSFULLY");
    } else {
        let _ = writeln!(out, "✗ {} RUNS FAILED", stats.failed_runs);
    }
    rule(&mut out, '=');
    out
}
