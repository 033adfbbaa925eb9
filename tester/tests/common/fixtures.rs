//! Test fixtures shared by the integration suites

use directory::attributes;
use ldap_tester::{Config, Runner, SuiteSelection};
use std::io::Write;
use std::sync::{Arc, Mutex};

use super::memory_directory::{MemoryConnector, MemoryServer};

pub struct TestFixtures;

impl TestFixtures {
    pub const BASE_DN: &'static str = "dc=example,dc=com";
    pub const ADMIN_DN: &'static str = "cn=admin,dc=example,dc=com";
    pub const ADMIN_PASSWORD: &'static str = "admin";
    pub const PREFIX: &'static str = "ldap-test";

    /// Server holding the base entry and an unrelated branch
    pub fn server() -> MemoryServer {
        let server = MemoryServer::new(Self::ADMIN_DN, Self::ADMIN_PASSWORD);
        server.seed(
            Self::BASE_DN,
            attributes(&[("objectClass", &["dcObject", "organization"]), ("dc", &["example"]), ("o", &["Example"])]),
        );
        server.seed(
            "ou=people,dc=example,dc=com",
            attributes(&[("objectClass", &["organizationalUnit"]), ("ou", &["people"])]),
        );
        server
    }

    pub fn config(selection: SuiteSelection) -> Config {
        Config {
            bind_dn: Self::ADMIN_DN.to_string(),
            bind_password: Self::ADMIN_PASSWORD.to_string(),
            base_dn: Self::BASE_DN.to_string(),
            test_prefix: Self::PREFIX.to_string(),
            test_suite: selection,
            cleanup: true,
            ..Config::default()
        }
    }

    /// Runner against `server`, with its report captured
    pub fn runner(config: Config, server: &MemoryServer) -> (Runner, OutputBuffer) {
        let output = OutputBuffer::default();
        let connector = Arc::new(MemoryConnector::new(server.clone()));
        let runner = Runner::new(config, connector).with_output(output.clone());
        (runner, output)
    }

    /// Seed a test root named as if created at `stamp` (`YYYYmmdd-HHMMSS`) with one child
    pub fn seed_old_root(server: &MemoryServer, stamp: &str) -> String {
        let name = format!("{}-{stamp}", Self::PREFIX);
        let dn = format!("ou={name},{}", Self::BASE_DN);
        server.seed(&dn, attributes(&[("objectClass", &["organizationalUnit"]), ("ou", &[name.as_str()])]));
        server.seed(
            &format!("cn=testuser,{dn}"),
            attributes(&[("objectClass", &["inetOrgPerson"]), ("cn", &["testuser"]), ("sn", &["User"])]),
        );
        dn
    }
}

/// Cloneable sink for runner output
#[derive(Clone, Default)]
pub struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
