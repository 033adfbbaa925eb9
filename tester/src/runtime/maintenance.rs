//! Retention maintenance for test roots left behind by earlier runs
//!
//! Test roots are named `<prefix>-YYYYmmdd-HHMMSS` (UTC) directly under the
//! base DN; the creation time is read back from that suffix.

use chrono::{DateTime, NaiveDateTime, Utc};
use directory::{Directory, DirectoryResult, SearchRequest, SearchScope, escape_filter_value};
use shared::{Component, component_debug, component_info, component_warn};
use std::fmt::Write as _;
use std::time::Duration;

use crate::core::{CleanupFailure, EntryKind, TrackedEntry, Tracker};

pub const ROOT_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Name of a fresh test root for `prefix` at `now`
pub fn test_root_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}", now.format(ROOT_TIMESTAMP_FORMAT))
}

/// Creation time encoded in a test root name, if it belongs to `prefix`
pub fn parse_root_timestamp(prefix: &str, name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(prefix)?.strip_prefix('-')?;
    NaiveDateTime::parse_from_str(stamp, ROOT_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Number of RDN components, honouring escaped commas
pub fn dn_depth(dn: &str) -> usize {
    if dn.is_empty() {
        return 0;
    }
    let mut depth = 1;
    let mut escaped = false;
    for c in dn.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            ',' if !escaped => depth += 1,
            _ => escaped = false,
        }
    }
    depth
}

/// Value of the leading RDN, e.g. `ldap-test-x` for `ou=ldap-test-x,dc=example`
fn leading_rdn_value(dn: &str) -> Option<&str> {
    let rdn = dn.split(',').next()?;
    rdn.split_once('=').map(|(_, value)| value.trim())
}

/// Find test roots under `base_dn` and record them with their creation time
pub async fn discover_test_roots(directory: &dyn Directory, base_dn: &str, prefix: &str) -> DirectoryResult<Tracker> {
    let filter = format!("(&(objectClass=organizationalUnit)(ou={}-*))", escape_filter_value(prefix));
    component_debug!(Component::Maintenance, base = base_dn, filter = %filter, "Searching for test roots");

    let request = SearchRequest::new(base_dn, SearchScope::OneLevel, filter).with_attributes(&["ou"]);
    let page = directory.search(request).await?;

    let tracker = Tracker::new();
    for entry in page.entries {
        let name = entry
            .first_value("ou")
            .or_else(|| leading_rdn_value(&entry.dn))
            .unwrap_or_default()
            .to_string();
        match parse_root_timestamp(prefix, &name) {
            Some(created_at) => tracker.track_at(entry.dn, EntryKind::Container, created_at),
            None => component_debug!(Component::Maintenance, dn = %entry.dn, "Skipping root without timestamp"),
        }
    }
    component_info!(Component::Maintenance, "🔍 Found {} test roots", tracker.count());
    Ok(tracker)
}

/// Every DN in the subtree of `root`, deepest first
async fn subtree_deepest_first(directory: &dyn Directory, root: &str) -> DirectoryResult<Vec<String>> {
    let request = SearchRequest::new(root, SearchScope::Subtree, "(objectClass=*)").with_attributes(&["1.1"]);
    let mut dns: Vec<String> = directory
        .search(request)
        .await?
        .entries
        .into_iter()
        .map(|entry| entry.dn)
        .collect();
    dns.sort_by_key(|dn| std::cmp::Reverse(dn_depth(dn)));
    Ok(dns)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootListing {
    pub root: TrackedEntry,
    /// Entries in the subtree including the root; `None` if counting failed
    pub entries: Option<usize>,
}

pub async fn list_test_data(directory: &dyn Directory, base_dn: &str, prefix: &str) -> DirectoryResult<Vec<RootListing>> {
    let tracker = discover_test_roots(directory, base_dn, prefix).await?;
    let mut listings = Vec::new();
    for root in tracker.entries() {
        let entries = match subtree_deepest_first(directory, &root.dn).await {
            Ok(dns) => Some(dns.len()),
            Err(e) => {
                component_warn!(Component::Maintenance, dn = %root.dn, "Failed to count entries: {e}");
                None
            }
        };
        listings.push(RootListing { root, entries });
    }
    Ok(listings)
}

pub fn render_listing(listings: &[RootListing]) -> String {
    let mut out = String::new();
    if listings.is_empty() {
        out.push_str("No test data found.\n");
        return out;
    }

    let _ = writeln!(out, "Existing test data ({} roots):", listings.len());
    for listing in listings {
        let count = listing
            .entries
            .map_or_else(|| "unknown".to_string(), |n| n.to_string());
        let _ = writeln!(
            out,
            "  - {}  created {}  entries: {count}",
            listing.root.dn,
            listing.root.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurgeReport {
    pub roots: usize,
    pub deleted: usize,
    pub failures: Vec<CleanupFailure>,
}

/// Delete every test root (with its subtree) older than `age`
pub async fn purge_older_than(
    directory: &dyn Directory,
    base_dn: &str,
    prefix: &str,
    age: Duration,
) -> DirectoryResult<PurgeReport> {
    let tracker = discover_test_roots(directory, base_dn, prefix).await?;
    let stale = tracker.entries_older_than(age);
    component_info!(
        Component::Maintenance,
        "🧹 {} of {} test roots are older than {}",
        stale.len(),
        tracker.count(),
        humantime::format_duration(age)
    );

    let mut report = PurgeReport {
        roots: stale.len(),
        ..PurgeReport::default()
    };
    for root in stale {
        let dns = match subtree_deepest_first(directory, &root.dn).await {
            Ok(dns) => dns,
            Err(e) => {
                component_warn!(Component::Maintenance, dn = %root.dn, "Failed to enumerate subtree: {e}");
                report.failures.push(CleanupFailure {
                    dn: root.dn,
                    error: e.to_string(),
                });
                continue;
            }
        };
        for dn in dns {
            match directory.delete(&dn).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    component_warn!(Component::Maintenance, "⚠️ Failed to delete {dn}: {e}");
                    report.failures.push(CleanupFailure { dn, error: e.to_string() });
                }
            }
        }
    }
    Ok(report)
}

pub fn render_purge(report: &PurgeReport, age: Duration) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Removed {} test roots older than {} ({} entries deleted, {} failures)",
        report.roots,
        humantime::format_duration(age),
        report.deleted,
        report.failures.len()
    );
    for failure in &report.failures {
        let _ = writeln!(out, "  ✗ {}: {}", failure.dn, failure.error);
    }
    out
}
