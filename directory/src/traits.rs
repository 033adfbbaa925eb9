//! Trait definitions with mockall annotations for testing
//!
//! The harness depends only on these seams. Production code injects
//! [`crate::LdapConnector`]; tests inject mocks or in-memory fakes.

use crate::error::DirectoryResult;
use crate::types::{AttributeSet, Modification, SearchPage, SearchRequest};
use std::sync::Arc;

/// Shared handle to one open directory connection
///
/// Cloning the handle does not open a new connection; every clone talks over
/// the same transport.
pub type DirectoryHandle = Arc<dyn Directory>;

/// Operations the harness issues against the server under test
#[mockall::automock]
#[async_trait::async_trait]
pub trait Directory: Send + Sync {
    /// Simple bind; an empty DN and secret is an anonymous bind
    async fn bind(&self, dn: &str, secret: &str) -> DirectoryResult<()>;

    /// One search round-trip, returning a single page when paging is requested
    async fn search(&self, request: SearchRequest) -> DirectoryResult<SearchPage>;

    async fn add(&self, dn: &str, attributes: AttributeSet) -> DirectoryResult<()>;

    async fn modify(&self, dn: &str, modifications: Vec<Modification>) -> DirectoryResult<()>;

    /// `Ok(true)` for compareTrue, `Ok(false)` for compareFalse
    async fn compare(&self, dn: &str, attribute: &str, value: &str) -> DirectoryResult<bool>;

    async fn delete(&self, dn: &str) -> DirectoryResult<()>;

    /// Modify DN: new RDN, optionally under a new superior
    async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        delete_old_rdn: bool,
        new_superior: Option<String>,
    ) -> DirectoryResult<()>;

    /// Graceful disconnect; the handle is unusable afterwards
    async fn unbind(&self) -> DirectoryResult<()>;
}

/// Opens unauthenticated connections to the server under test
#[mockall::automock]
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Address used in logs and error messages
    fn address(&self) -> String;

    async fn connect(&self) -> DirectoryResult<DirectoryHandle>;
}
