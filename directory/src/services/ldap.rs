//! `ldap3`-backed implementation of the directory capability

use async_trait::async_trait;
use ldap3::controls::{Control, ControlType, PagedResults, RawControl};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Mod, Scope, SearchEntry};
use shared::logging;
use shared::{Component, OperationKind, component_debug, component_info, component_warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{DirectoryError, DirectoryResult};
use crate::result_code::ResultCode;
use crate::traits::{Connector, Directory, DirectoryHandle};
use crate::types::{
    AttributeSet, ConnectionSettings, DirectoryEntry, ModifyKind, Modification, SearchPage, SearchRequest,
    SearchScope, TlsMode,
};

/// Opens `ldap3` connections using fixed connection settings
#[derive(Debug, Clone)]
pub struct LdapConnector {
    settings: ConnectionSettings,
}

impl LdapConnector {
    pub fn new(settings: ConnectionSettings) -> Self {
        if settings.insecure_skip_verify {
            component_warn!(
                Component::Connection,
                "⚠️ Certificate verification is DISABLED - not recommended for production"
            );
        }
        Self { settings }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    fn conn_settings(&self) -> LdapConnSettings {
        LdapConnSettings::new()
            .set_conn_timeout(self.settings.timeout)
            .set_starttls(self.settings.tls == TlsMode::StartTls)
            .set_no_tls_verify(self.settings.insecure_skip_verify)
    }
}

#[async_trait]
impl Connector for LdapConnector {
    fn address(&self) -> String {
        self.settings.url()
    }

    async fn connect(&self) -> DirectoryResult<DirectoryHandle> {
        let url = self.settings.url();
        component_debug!(Component::Connection, address = %url, "Attempting to connect to LDAP server");

        let (conn, ldap) = LdapConnAsync::with_settings(self.conn_settings(), &url)
            .await
            .map_err(|e| DirectoryError::Connect {
                address: url.clone(),
                message: e.to_string(),
            })?;

        // The driver owns the socket; it exits once every `Ldap` handle is dropped
        // or an unbind has been sent.
        let driver_address = url.clone();
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                component_warn!(Component::Connection, address = %driver_address, "LDAP connection error: {e}");
            }
        });

        component_info!(Component::Connection, address = %url, "Successfully connected to LDAP server");
        Ok(Arc::new(LdapDirectory::new(ldap, url, self.settings.timeout)))
    }
}

/// One live `ldap3` connection
///
/// `ldap3::Ldap` is a cheap handle over a shared channel, so every operation
/// clones it and the directory can be used through `&self` from several tasks.
#[derive(Clone)]
pub struct LdapDirectory {
    ldap: Ldap,
    address: String,
    timeout: Duration,
}

impl LdapDirectory {
    pub fn new(ldap: Ldap, address: String, timeout: Duration) -> Self {
        Self { ldap, address, timeout }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn handle(&self) -> Ldap {
        let mut ldap = self.ldap.clone();
        if !self.timeout.is_zero() {
            ldap.with_timeout(self.timeout);
        }
        ldap
    }

    fn map_error(&self, operation: OperationKind, err: LdapError) -> DirectoryError {
        match err {
            LdapError::LdapResult { result } => {
                DirectoryError::server(operation, ResultCode::from_code(result.rc), result.text)
            }
            LdapError::Timeout { .. } => DirectoryError::Timeout {
                operation,
                timeout: self.timeout,
            },
            other => DirectoryError::Transport {
                operation,
                message: other.to_string(),
            },
        }
    }

    fn record<T>(&self, operation: OperationKind, started: Instant, result: &DirectoryResult<T>) {
        let elapsed = started.elapsed();
        match result {
            Ok(_) => logging::log_directory_result(
                Component::Connection,
                operation,
                true,
                Some(0),
                "Success",
                elapsed,
            ),
            Err(e) => logging::log_directory_result(
                Component::Connection,
                operation,
                false,
                e.code().map(|c| c.code()),
                &e.to_string(),
                elapsed,
            ),
        }
    }
}

fn to_scope(scope: SearchScope) -> Scope {
    match scope {
        SearchScope::Base => Scope::Base,
        SearchScope::OneLevel => Scope::OneLevel,
        SearchScope::Subtree => Scope::Subtree,
    }
}

fn value_set(values: &[String]) -> HashSet<&str> {
    values.iter().map(String::as_str).collect()
}

fn next_cursor(controls: &[Control]) -> Option<Vec<u8>> {
    controls.iter().find_map(|Control(kind, raw)| match kind {
        Some(ControlType::PagedResults) => {
            let paged: PagedResults = raw.parse();
            (!paged.cookie.is_empty()).then_some(paged.cookie)
        }
        _ => None,
    })
}

#[async_trait]
impl Directory for LdapDirectory {
    async fn bind(&self, dn: &str, secret: &str) -> DirectoryResult<()> {
        let started = Instant::now();
        let result = match self.handle().simple_bind(dn, secret).await {
            Ok(res) => res.success().map(|_| ()).map_err(|e| self.map_error(OperationKind::Bind, e)),
            Err(e) => Err(self.map_error(OperationKind::Bind, e)),
        };
        self.record(OperationKind::Bind, started, &result);
        result
    }

    async fn search(&self, request: SearchRequest) -> DirectoryResult<SearchPage> {
        let started = Instant::now();
        let mut ldap = self.handle();
        if let Some(page) = &request.page {
            let control: RawControl = PagedResults {
                size: page.size,
                cookie: page.cursor.clone(),
            }
            .into();
            ldap.with_controls(vec![control]);
        }

        let outcome = ldap
            .search(&request.base, to_scope(request.scope), &request.filter, request.attributes.clone())
            .await
            .and_then(|res| res.success());

        let result = match outcome {
            Ok((entries, ldap_result)) => Ok(SearchPage {
                entries: entries
                    .into_iter()
                    .map(|raw| {
                        let entry = SearchEntry::construct(raw);
                        DirectoryEntry {
                            dn: entry.dn,
                            attributes: entry.attrs.into_iter().collect(),
                        }
                    })
                    .collect(),
                next_cursor: next_cursor(&ldap_result.ctrls),
            }),
            Err(e) => Err(self.map_error(OperationKind::Search, e)),
        };
        self.record(OperationKind::Search, started, &result);
        result
    }

    async fn add(&self, dn: &str, attributes: AttributeSet) -> DirectoryResult<()> {
        let started = Instant::now();
        let attrs: Vec<(&str, HashSet<&str>)> = attributes
            .iter()
            .map(|(name, values)| (name.as_str(), value_set(values)))
            .collect();

        let result = self
            .handle()
            .add(dn, attrs)
            .await
            .and_then(|res| res.success())
            .map(|_| ())
            .map_err(|e| self.map_error(OperationKind::Add, e));
        self.record(OperationKind::Add, started, &result);
        result
    }

    async fn modify(&self, dn: &str, modifications: Vec<Modification>) -> DirectoryResult<()> {
        let started = Instant::now();
        let mods: Vec<Mod<&str>> = modifications
            .iter()
            .map(|m| match m.kind {
                ModifyKind::Add => Mod::Add(m.attribute.as_str(), value_set(&m.values)),
                ModifyKind::Replace => Mod::Replace(m.attribute.as_str(), value_set(&m.values)),
                ModifyKind::Delete => Mod::Delete(m.attribute.as_str(), value_set(&m.values)),
            })
            .collect();

        let result = self
            .handle()
            .modify(dn, mods)
            .await
            .and_then(|res| res.success())
            .map(|_| ())
            .map_err(|e| self.map_error(OperationKind::Modify, e));
        self.record(OperationKind::Modify, started, &result);
        result
    }

    async fn compare(&self, dn: &str, attribute: &str, value: &str) -> DirectoryResult<bool> {
        let started = Instant::now();
        let result = self
            .handle()
            .compare(dn, attribute, value)
            .await
            .and_then(|res| res.equal())
            .map_err(|e| self.map_error(OperationKind::Compare, e));
        self.record(OperationKind::Compare, started, &result);
        result
    }

    async fn delete(&self, dn: &str) -> DirectoryResult<()> {
        let started = Instant::now();
        let result = self
            .handle()
            .delete(dn)
            .await
            .and_then(|res| res.success())
            .map(|_| ())
            .map_err(|e| self.map_error(OperationKind::Delete, e));
        self.record(OperationKind::Delete, started, &result);
        result
    }

    async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        delete_old_rdn: bool,
        new_superior: Option<String>,
    ) -> DirectoryResult<()> {
        let started = Instant::now();
        let result = self
            .handle()
            .modifydn(dn, new_rdn, delete_old_rdn, new_superior.as_deref())
            .await
            .and_then(|res| res.success())
            .map(|_| ())
            .map_err(|e| self.map_error(OperationKind::ModifyDn, e));
        self.record(OperationKind::ModifyDn, started, &result);
        result
    }

    async fn unbind(&self) -> DirectoryResult<()> {
        let started = Instant::now();
        let result = self
            .handle()
            .unbind()
            .await
            .map_err(|e| self.map_error(OperationKind::Unbind, e));
        self.record(OperationKind::Unbind, started, &result);
        result
    }
}
