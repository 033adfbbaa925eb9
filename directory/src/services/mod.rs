//! Production service implementations

pub mod ldap;

pub use ldap::{LdapConnector, LdapDirectory};
