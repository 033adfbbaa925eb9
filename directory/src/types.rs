//! Request and response types exchanged with the directory

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Attribute name to values, ordered so logs and requests are deterministic
pub type AttributeSet = BTreeMap<String, Vec<String>>;

/// Build an [`AttributeSet`] from string literals
pub fn attributes(pairs: &[(&str, &[&str])]) -> AttributeSet {
    pairs
        .iter()
        .map(|(name, values)| (name.to_string(), values.iter().map(|v| v.to_string()).collect()))
        .collect()
}

/// Escape a literal for use inside a search filter assertion (RFC 4515)
pub fn escape_filter_value(value: &str) -> String {
    ldap3::ldap_escape(value).into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchScope {
    Base,
    OneLevel,
    Subtree,
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchScope::Base => f.write_str("base"),
            SearchScope::OneLevel => f.write_str("one"),
            SearchScope::Subtree => f.write_str("sub"),
        }
    }
}

/// Simple Paged Results request: page size plus the cursor from the previous page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub size: i32,
    pub cursor: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base: String,
    pub scope: SearchScope,
    pub filter: String,
    pub attributes: Vec<String>,
    pub page: Option<PageRequest>,
}

impl SearchRequest {
    pub fn new(base: impl Into<String>, scope: SearchScope, filter: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            scope,
            filter: filter.into(),
            attributes: Vec::new(),
            page: None,
        }
    }

    pub fn with_attributes(mut self, attributes: &[&str]) -> Self {
        self.attributes = attributes.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_page(mut self, size: i32, cursor: Vec<u8>) -> Self {
        self.page = Some(PageRequest { size, cursor });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attributes: AttributeSet,
}

impl DirectoryEntry {
    /// First value of an attribute, matching the name case-insensitively
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// One page of search results; `next_cursor` is `None` once the server has no more pages
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPage {
    pub entries: Vec<DirectoryEntry>,
    pub next_cursor: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyKind {
    Add,
    Replace,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub kind: ModifyKind,
    pub attribute: String,
    pub values: Vec<String>,
}

impl Modification {
    pub fn add(attribute: &str, values: &[&str]) -> Self {
        Self::new(ModifyKind::Add, attribute, values)
    }

    pub fn replace(attribute: &str, values: &[&str]) -> Self {
        Self::new(ModifyKind::Replace, attribute, values)
    }

    /// An empty value list removes every value of the attribute
    pub fn delete(attribute: &str, values: &[&str]) -> Self {
        Self::new(ModifyKind::Delete, attribute, values)
    }

    fn new(kind: ModifyKind, attribute: &str, values: &[&str]) -> Self {
        Self {
            kind,
            attribute: attribute.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Transport security for the directory connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TlsMode {
    #[default]
    Plain,
    Ldaps,
    StartTls,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
    pub timeout: Duration,
    pub insecure_skip_verify: bool,
}

impl ConnectionSettings {
    pub fn url(&self) -> String {
        let scheme = match self.tls {
            TlsMode::Ldaps => "ldaps",
            TlsMode::Plain | TlsMode::StartTls => "ldap",
        };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}
