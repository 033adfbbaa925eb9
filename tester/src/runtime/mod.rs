//! Runtime Management
//!
//! Run lifecycle, cleanup of created entries, retention maintenance and
//! interrupt handling.

pub mod cleanup;
pub mod maintenance;
pub mod runner;
pub mod signals;

pub use cleanup::perform_cleanup;
pub use maintenance::{PurgeReport, RootListing, list_test_data, purge_older_than, render_listing, render_purge};
pub use runner::{Runner, RunnerPhase, SUITE_NAME};
pub use signals::{InterruptFlag, spawn_listener};
