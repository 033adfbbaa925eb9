//! Shared vocabulary for the LDAP conformance workspace
//!
//! Holds the types that cross crate boundaries (operation kinds, log
//! components) and the logging setup every binary and library uses.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use logging::LogLevel;
pub use types::*;
