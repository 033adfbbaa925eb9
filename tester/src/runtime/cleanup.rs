//! Reverse-order deletion of everything a run created

use directory::{Directory, ResultCode};
use shared::{Component, component_debug, component_info, component_warn};

use crate::core::{CleanupFailure, CleanupReport, Tracker};

/// Delete every tracked entry, newest first
///
/// Children are tracked after their parents, so reverse order deletes leaves
/// before containers. A failed delete is recorded and the next entry is
/// attempted; nothing here returns early. `noSuchObject` counts as absent
/// because renamed entries leave their old name in the ledger.
pub async fn perform_cleanup(directory: &dyn Directory, tracker: &Tracker) -> CleanupReport {
    let entries = tracker.entries_reversed();
    component_info!(Component::Cleanup, "🧹 Starting cleanup of {} tracked entries", entries.len());

    let mut report = CleanupReport {
        attempted: entries.len(),
        ..CleanupReport::default()
    };

    for entry in entries {
        match directory.delete(&entry.dn).await {
            Ok(()) => {
                component_debug!(Component::Cleanup, kind = %entry.kind, "Deleted {}", entry.dn);
                report.deleted += 1;
            }
            Err(e) if e.has_code(ResultCode::NoSuchObject) => {
                component_debug!(Component::Cleanup, kind = %entry.kind, "Already absent: {}", entry.dn);
                report.absent += 1;
            }
            Err(e) => {
                component_warn!(Component::Cleanup, kind = %entry.kind, "⚠️ Failed to delete {}: {e}", entry.dn);
                report.failures.push(CleanupFailure {
                    dn: entry.dn,
                    error: e.to_string(),
                });
            }
        }
    }

    if report.is_clean() {
        component_info!(
            Component::Cleanup,
            deleted = report.deleted,
            absent = report.absent,
            "✅ Cleanup completed successfully"
        );
    } else {
        component_warn!(
            Component::Cleanup,
            deleted = report.deleted,
            failed = report.failed(),
            "⚠️ Cleanup completed with errors: failed to delete {} of {} entries",
            report.failed(),
            report.attempted
        );
    }
    report
}
