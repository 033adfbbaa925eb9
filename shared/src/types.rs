//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// The nine LDAP protocol operations exercised by the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationKind {
    Bind,
    Add,
    Search,
    Modify,
    Compare,
    #[serde(rename = "ModifyDN")]
    ModifyDn,
    Delete,
    Abandon,
    Unbind,
}

impl OperationKind {
    pub const ALL: [OperationKind; 9] = [
        OperationKind::Bind,
        OperationKind::Add,
        OperationKind::Search,
        OperationKind::Modify,
        OperationKind::Compare,
        OperationKind::ModifyDn,
        OperationKind::Delete,
        OperationKind::Abandon,
        OperationKind::Unbind,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Bind => "Bind",
            OperationKind::Add => "Add",
            OperationKind::Search => "Search",
            OperationKind::Modify => "Modify",
            OperationKind::Compare => "Compare",
            OperationKind::ModifyDn => "ModifyDN",
            OperationKind::Delete => "Delete",
            OperationKind::Abandon => "Abandon",
            OperationKind::Unbind => "Unbind",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical source of a log line, attached as the `component` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Main,
    Connection,
    HealthCheck,
    Runner,
    Setup,
    Cleanup,
    Tracker,
    Maintenance,
    Report,
    Suite(OperationKind),
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Main => f.write_str("Main"),
            Component::Connection => f.write_str("Connection"),
            Component::HealthCheck => f.write_str("HealthCheck"),
            Component::Runner => f.write_str("TestRunner"),
            Component::Setup => f.write_str("Setup"),
            Component::Cleanup => f.write_str("Cleanup"),
            Component::Tracker => f.write_str("Tracker"),
            Component::Maintenance => f.write_str("Maintenance"),
            Component::Report => f.write_str("Report"),
            Component::Suite(operation) => write!(f, "{operation}Test"),
        }
    }
}
