//! Cleanup of tracked entries against the in-memory directory

use directory::{Connector, attributes};
use ldap_tester::runtime::perform_cleanup;
use ldap_tester::{EntryKind, Tracker};

mod common;
use common::{MemoryConnector, TestFixtures};

const ROOT: &str = "ou=ldap-test-20250101-000000,dc=example,dc=com";

fn seeded() -> (common::MemoryServer, Tracker) {
    let server = TestFixtures::server();
    let tracker = Tracker::new();
    server.seed(ROOT, attributes(&[("objectClass", &["organizationalUnit"])]));
    tracker.track(ROOT, EntryKind::Container);
    for cn in ["a", "b", "c", "d"] {
        let dn = format!("cn={cn},{ROOT}");
        server.seed(&dn, attributes(&[("objectClass", &["inetOrgPerson"]), ("sn", &[cn])]));
        tracker.track(dn, EntryKind::Principal);
    }
    (server, tracker)
}

#[tokio::test]
async fn test_partial_failure_attempts_every_entry() {
    let (server, tracker) = seeded();
    let stuck = format!("cn=b,{ROOT}");
    server.fail_deletes_of(&stuck);
    let directory = MemoryConnector::new(server.clone()).connect().await.unwrap();

    let report = perform_cleanup(directory.as_ref(), &tracker).await;

    assert_eq!(report.attempted, 5);
    assert_eq!(report.deleted, 3);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.dn.as_str()).collect();
    assert_eq!(failed, vec![stuck.as_str(), ROOT]);
    assert!(server.contains(&stuck));
    assert!(!server.contains(&format!("cn=a,{ROOT}")));
}

#[tokio::test]
async fn test_already_deleted_entries_count_as_absent() {
    let (server, tracker) = seeded();
    tracker.track(format!("cn=renamed-away,{ROOT}"), EntryKind::Principal);
    let directory = MemoryConnector::new(server.clone()).connect().await.unwrap();

    let report = perform_cleanup(directory.as_ref(), &tracker).await;

    assert_eq!(report.deleted, 5);
    assert_eq!(report.absent, 1);
    assert!(report.is_clean());
    assert!(!server.contains(ROOT));
}
