//! Common test utilities and infrastructure
//!
//! Each integration test binary pulls in the whole module and uses a
//! different slice of it.
#![allow(dead_code)]

pub mod fixtures;
pub mod memory_directory;

pub use fixtures::TestFixtures;
#[allow(unused_imports)]
pub use memory_directory::{MemoryConnector, MemoryServer};
