//! Directory capability for the LDAP conformance harness
//!
//! The harness never encodes LDAP itself. It talks to the server under test
//! through the [`Directory`] and [`Connector`] traits; [`LdapConnector`] is the
//! production implementation backed by the `ldap3` async client.

pub mod error;
pub mod result_code;
pub mod services;
pub mod traits;
pub mod types;

pub use error::{DirectoryError, DirectoryResult};
pub use result_code::ResultCode;
pub use services::{LdapConnector, LdapDirectory};
pub use traits::{Connector, Directory, DirectoryHandle, MockConnector, MockDirectory};
pub use types::{
    AttributeSet, ConnectionSettings, DirectoryEntry, ModifyKind, Modification, PageRequest, SearchPage,
    SearchRequest, SearchScope, TlsMode, attributes, escape_filter_value,
};
