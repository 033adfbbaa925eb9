//! Helpers for suite unit tests

use directory::{DirectoryError, MockConnector, MockDirectory, ResultCode};
use shared::OperationKind;
use std::sync::Arc;
use std::time::Duration;

use super::{Credentials, SuiteContext};
use crate::core::Tracker;

pub const TEST_ROOT: &str = "ou=ldap-test-20250101-000000,dc=example,dc=com";
pub const BASE_DN: &str = "dc=example,dc=com";

pub fn server_error(operation: OperationKind, code: ResultCode) -> DirectoryError {
    DirectoryError::server(operation, code, "mock rejection")
}

pub fn context(directory: MockDirectory, connector: MockConnector) -> SuiteContext {
    SuiteContext {
        directory: Arc::new(directory),
        connector: Arc::new(connector),
        credentials: Credentials {
            bind_dn: "cn=admin,dc=example,dc=com".to_string(),
            bind_password: "admin".to_string(),
        },
        base_dn: BASE_DN.to_string(),
        test_root: TEST_ROOT.to_string(),
        tracker: Arc::new(Tracker::new()),
        abandon_wait: Duration::from_millis(200),
    }
}

pub fn context_with(directory: MockDirectory) -> SuiteContext {
    context(directory, MockConnector::new())
}
