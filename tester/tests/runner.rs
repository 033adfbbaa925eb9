//! End-to-end runs of the harness against the in-memory directory

use ldap_tester::{InterruptFlag, ReportFormat, RunnerPhase, SuiteSelection, TesterError};
use shared::OperationKind;

mod common;
use common::TestFixtures;

#[tokio::test]
async fn test_full_run_passes_and_cleans_up() {
    let server = TestFixtures::server();
    let (mut runner, output) = TestFixtures::runner(TestFixtures::config(SuiteSelection::All), &server);

    runner.run_once().await.unwrap();

    let run = runner.last_run().unwrap();
    let failures: Vec<String> = run.failures().map(|f| format!("{}: {}", f.name, f.message)).collect();
    assert!(failures.is_empty(), "unexpected failures: {failures:#?}");
    assert_eq!(run.results.len(), 32);
    assert!(run.test_root.as_deref().is_some_and(|root| root.starts_with("ou=ldap-test-")));

    // Renames leave their original names in the ledger
    let cleanup = run.cleanup.as_ref().unwrap();
    assert_eq!(cleanup.attempted, 11);
    assert_eq!(cleanup.deleted, 8);
    assert_eq!(cleanup.absent, 3);
    assert!(cleanup.is_clean());

    assert_eq!(server.len(), 2, "only the seeded entries should remain");
    assert_eq!(server.open_sessions(), 0);
    assert_eq!(runner.phase(), RunnerPhase::Done);
    assert_eq!(runner.exit_code(), 0);

    let text = output.contents();
    assert!(text.contains("Total Tests:     32"));
    assert!(text.contains("Cleanup: 8 deleted, 3 already absent, 0 failed"));
    assert!(text.contains("✓ ALL TESTS PASSED"));
}

#[tokio::test]
async fn test_suites_run_in_dependency_order() {
    let server = TestFixtures::server();
    let (mut runner, _output) = TestFixtures::runner(TestFixtures::config(SuiteSelection::All), &server);
    runner.run_once().await.unwrap();

    let mut order: Vec<OperationKind> = Vec::new();
    for result in &runner.last_run().unwrap().results {
        if order.last() != Some(&result.operation) {
            order.push(result.operation);
        }
    }
    assert_eq!(
        order,
        vec![
            OperationKind::Bind,
            OperationKind::Add,
            OperationKind::Search,
            OperationKind::Compare,
            OperationKind::Modify,
            OperationKind::ModifyDn,
            OperationKind::Delete,
            OperationKind::Abandon,
            OperationKind::Unbind,
        ]
    );
}

#[tokio::test]
async fn test_without_cleanup_entries_are_preserved_and_listed() {
    let server = TestFixtures::server();
    let config = ldap_tester::Config {
        cleanup: false,
        ..TestFixtures::config(SuiteSelection::All)
    };
    let (mut runner, output) = TestFixtures::runner(config, &server);
    runner.run_once().await.unwrap();

    let run = runner.last_run().unwrap();
    let root = run.test_root.clone().unwrap();
    assert!(run.cleanup.is_none());
    assert!(server.contains(&root));
    // root, test-ou, testuser, testgroup, renamed-user, target-ou and the two moved users
    assert_eq!(server.subtree_size(&root), 8);
    assert_eq!(runner.tracker().count(), 11);
    assert!(output.contents().contains("Use --cleanup flag"));
}

#[tokio::test]
async fn test_deleted_leaf_is_gone_and_untracked() {
    let server = TestFixtures::server();
    let config = ldap_tester::Config {
        cleanup: false,
        ..TestFixtures::config(SuiteSelection::All)
    };
    let (mut runner, _output) = TestFixtures::runner(config, &server);
    runner.run_once().await.unwrap();

    let root = runner.last_run().unwrap().test_root.clone().unwrap();
    let leaf = format!("cn=delete-test-user,{root}");
    assert!(!server.contains(&leaf));
    assert!(runner.tracker().entries().iter().all(|entry| entry.dn != leaf));
    assert!(
        server
            .operations()
            .iter()
            .any(|(op, dn)| *op == OperationKind::Delete && *dn == leaf)
    );
}

#[tokio::test]
async fn test_dry_run_creates_nothing() {
    let server = TestFixtures::server();
    let config = ldap_tester::Config {
        dry_run: true,
        ..TestFixtures::config(SuiteSelection::All)
    };
    let (mut runner, _output) = TestFixtures::runner(config, &server);
    runner.run_once().await.unwrap();

    let run = runner.last_run().unwrap();
    assert!(run.results.is_empty());
    assert!(run.cleanup.is_none());
    assert_eq!(server.len(), 2);
    assert!(server.operations().iter().all(|(op, _)| *op != OperationKind::Add));
    assert_eq!(runner.exit_code(), 0);
}

#[tokio::test]
async fn test_unreachable_server_aborts_run() {
    let server = TestFixtures::server();
    server.set_unreachable(true);
    let (mut runner, output) = TestFixtures::runner(TestFixtures::config(SuiteSelection::All), &server);

    let result = runner.run_once().await;

    assert!(matches!(result, Err(TesterError::Connection(_))));
    assert!(runner.last_run().unwrap().is_aborted());
    assert_eq!(runner.exit_code(), 1);
    assert!(output.contents().is_empty());
}

#[tokio::test]
async fn test_wrong_password_aborts_and_closes_connection() {
    let server = TestFixtures::server();
    let config = ldap_tester::Config {
        bind_password: "wrong".to_string(),
        ..TestFixtures::config(SuiteSelection::All)
    };
    let (mut runner, _output) = TestFixtures::runner(config, &server);

    assert!(runner.run_once().await.is_err());
    assert_eq!(runner.exit_code(), 1);
    assert_eq!(server.open_sessions(), 0);
    assert_eq!(server.len(), 2);
}

#[tokio::test]
async fn test_single_suite_without_add_reports_failures() {
    let server = TestFixtures::server();
    let (mut runner, _output) = TestFixtures::runner(TestFixtures::config(SuiteSelection::Compare), &server);
    runner.run_once().await.unwrap();

    let run = runner.last_run().unwrap();
    assert_eq!(run.results.len(), 4);
    assert!(run.results.iter().all(|r| r.operation == OperationKind::Compare));
    // The shared test user only exists once Add has run
    assert!(!run.results[0].passed);
    assert_eq!(runner.exit_code(), 1);
}

#[tokio::test]
async fn test_json_report_is_emitted() {
    let server = TestFixtures::server();
    let config = ldap_tester::Config {
        report_format: ReportFormat::Json,
        ..TestFixtures::config(SuiteSelection::Bind)
    };
    let (mut runner, output) = TestFixtures::runner(config, &server);
    runner.run_once().await.unwrap();

    let report: serde_json::Value = serde_json::from_str(&output.contents()).unwrap();
    assert_eq!(report["total"], 3);
    assert_eq!(report["all_passed"], true);
    assert_eq!(report["cleanup"]["deleted"], 1);
}

#[tokio::test]
async fn test_loop_mode_accumulates_statistics() {
    let server = TestFixtures::server();
    let config = ldap_tester::Config {
        loop_mode: true,
        loop_count: 3,
        loop_delay: 0,
        ..TestFixtures::config(SuiteSelection::All)
    };
    let (mut runner, output) = TestFixtures::runner(config, &server);

    runner.run(&InterruptFlag::new()).await.unwrap();

    let stats = runner.statistics();
    assert_eq!(stats.total_runs, 3);
    assert_eq!(stats.successful_runs, 3);
    assert_eq!(stats.total_tests, 96);
    assert_eq!(stats.total_failed, 0);
    assert_eq!(stats.cleanup_failures, 0);
    assert!(runner.tracker().is_empty());
    assert_eq!(server.len(), 2);

    let text = output.contents();
    assert!(text.contains("[Iteration 3] Tests: 32 passed, 0 failed"));
    assert!(text.contains("[Cumulative] Runs: 3, Success: 3, Failed: 0, Total Tests: 96/96 (100.0% pass rate)"));
    assert!(text.contains("LOOP MODE SUMMARY"));
    assert!(!text.contains("LDAP OPERATIONS TEST SUITE RESULTS"));
}

#[tokio::test]
async fn test_interrupted_loop_runs_no_iterations() {
    let server = TestFixtures::server();
    let config = ldap_tester::Config {
        loop_mode: true,
        loop_count: 0,
        ..TestFixtures::config(SuiteSelection::All)
    };
    let (mut runner, output) = TestFixtures::runner(config, &server);
    let interrupt = InterruptFlag::new();
    interrupt.raise();

    runner.run(&interrupt).await.unwrap();

    assert_eq!(runner.statistics().total_runs, 0);
    assert!(output.contents().contains("Total Iterations:     0"));
    assert!(server.operations().is_empty());
}
