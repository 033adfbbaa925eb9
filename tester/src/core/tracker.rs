//! Ledger of directory entries created during a run
//!
//! Entries are kept in creation order. Cleanup walks the ledger backwards so
//! children and referencing entries go before the containers and principals
//! they depend on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{Component, component_debug};
use std::fmt::{self, Write as _};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntryKind {
    Container,
    Principal,
    Group,
    Other,
}

impl EntryKind {
    /// Presentation order used by [`Tracker::summarize`]
    pub const ALL: [EntryKind; 4] = [
        EntryKind::Container,
        EntryKind::Principal,
        EntryKind::Group,
        EntryKind::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Container => "OU",
            EntryKind::Principal => "User",
            EntryKind::Group => "Group",
            EntryKind::Other => "Other",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedEntry {
    pub dn: String,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Tracker {
    entries: Mutex<Vec<TrackedEntry>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section is a single Vec operation; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<TrackedEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an entry created now
    pub fn track(&self, dn: impl Into<String>, kind: EntryKind) {
        self.track_at(dn, kind, Utc::now());
    }

    /// Record an entry with a known creation time
    pub fn track_at(&self, dn: impl Into<String>, kind: EntryKind, created_at: DateTime<Utc>) {
        let entry = TrackedEntry {
            dn: dn.into(),
            kind,
            created_at,
        };
        component_debug!(Component::Tracker, dn = %entry.dn, kind = %entry.kind, "Tracked entry");
        self.lock().push(entry);
    }

    /// Snapshot in creation order
    pub fn entries(&self) -> Vec<TrackedEntry> {
        self.lock().clone()
    }

    /// Snapshot in reverse creation order, the cleanup traversal order
    pub fn entries_reversed(&self) -> Vec<TrackedEntry> {
        self.lock().iter().rev().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
        component_debug!(Component::Tracker, "Cleared all tracked entries");
    }

    /// Entries created strictly more than `age` ago
    pub fn entries_older_than(&self, age: Duration) -> Vec<TrackedEntry> {
        let now = Utc::now();
        self.lock()
            .iter()
            .filter(|entry| {
                (now - entry.created_at)
                    .to_std()
                    .map(|elapsed| elapsed > age)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Human readable summary grouped by kind
    pub fn summarize(&self) -> String {
        summarize_entries(&self.entries())
    }
}

/// Render a grouped summary of preserved entries
pub fn summarize_entries(entries: &[TrackedEntry]) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        out.push_str("\nNo test data was created.\n");
        return out;
    }

    let _ = writeln!(out, "\n=== Created Test Data Summary ===");
    let _ = writeln!(out, "Total entries created: {}\n", entries.len());

    for kind in EntryKind::ALL {
        let dns: Vec<&str> = entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.dn.as_str())
            .collect();
        if dns.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{kind} entries ({}):", dns.len());
        for dn in dns {
            let _ = writeln!(out, "  - {dn}");
        }
        out.push('\n');
    }

    out.push_str("Note: Test data has been preserved. Use --cleanup flag to remove it automatically.\n");
    out
}
