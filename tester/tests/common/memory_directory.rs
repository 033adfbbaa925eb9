//! In-memory directory server for integration tests
//!
//! Enforces the server rules the suites probe: parents must exist, names are
//! unique, only leaves can be deleted or renamed, inetOrgPerson needs `sn`.
//! Several sessions share one tree, the way connections share a real server.

use async_trait::async_trait;
use directory::{
    AttributeSet, Connector, Directory, DirectoryEntry, DirectoryError, DirectoryHandle, DirectoryResult,
    ModifyKind, Modification, ResultCode, SearchPage, SearchRequest, SearchScope,
};
use shared::OperationKind;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Lowercased DN with whitespace around RDN separators removed
pub fn normalize(dn: &str) -> String {
    dn.split(',')
        .map(|rdn| rdn.trim().to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

fn parent_of(normalized: &str) -> Option<&str> {
    normalized.split_once(',').map(|(_, parent)| parent)
}

fn depth(normalized: &str) -> usize {
    normalized.split(',').count()
}

fn values_of<'a>(attrs: &'a AttributeSet, name: &str) -> Option<&'a Vec<String>> {
    attrs
        .iter()
        .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
        .map(|(_, values)| values)
}

fn values_of_mut<'a>(attrs: &'a mut AttributeSet, name: &str) -> Option<&'a mut Vec<String>> {
    attrs
        .iter_mut()
        .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
        .map(|(_, values)| values)
}

fn remove_attribute(attrs: &mut AttributeSet, name: &str) -> bool {
    let key = attrs.keys().find(|attr| attr.eq_ignore_ascii_case(name)).cloned();
    key.and_then(|key| attrs.remove(&key)).is_some()
}

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Present(String),
    Equal(String, String),
    Prefix(String, String),
}

fn parse_filter(input: &str) -> Option<(Filter, &str)> {
    let body = input.trim_start().strip_prefix('(')?;
    match body.chars().next()? {
        op @ ('&' | '|') => {
            let mut rest = &body[1..];
            let mut parts = Vec::new();
            while rest.starts_with('(') {
                let (part, remaining) = parse_filter(rest)?;
                parts.push(part);
                rest = remaining;
            }
            let rest = rest.strip_prefix(')')?;
            let filter = if op == '&' { Filter::And(parts) } else { Filter::Or(parts) };
            Some((filter, rest))
        }
        '!' => {
            let (inner, rest) = parse_filter(&body[1..])?;
            Some((Filter::Not(Box::new(inner)), rest.strip_prefix(')')?))
        }
        _ => {
            let end = body.find(')')?;
            let (attr, value) = body[..end].split_once('=')?;
            let attr = attr.trim().to_string();
            let filter = match value {
                "*" => Filter::Present(attr),
                v if v.ends_with('*') => Filter::Prefix(attr, v.trim_end_matches('*').to_ascii_lowercase()),
                v => Filter::Equal(attr, v.to_ascii_lowercase()),
            };
            Some((filter, &body[end + 1..]))
        }
    }
}

impl Filter {
    fn parse(text: &str) -> Option<Filter> {
        match parse_filter(text)? {
            (filter, rest) if rest.trim().is_empty() => Some(filter),
            _ => None,
        }
    }

    fn matches(&self, entry: &DirectoryEntry) -> bool {
        match self {
            Filter::And(parts) => parts.iter().all(|f| f.matches(entry)),
            Filter::Or(parts) => parts.iter().any(|f| f.matches(entry)),
            Filter::Not(inner) => !inner.matches(entry),
            Filter::Present(attr) => attr.eq_ignore_ascii_case("objectClass") || values_of(&entry.attributes, attr).is_some(),
            Filter::Equal(attr, value) => any_value(entry, attr, |v| v == value),
            Filter::Prefix(attr, prefix) => any_value(entry, attr, |v| v.starts_with(prefix.as_str())),
        }
    }
}

/// Whether any lowercased value of `attr` passes `test`
fn any_value(entry: &DirectoryEntry, attr: &str, test: impl Fn(&String) -> bool) -> bool {
    values_of(&entry.attributes, attr).is_some_and(|values| values.iter().any(|v| test(&v.to_ascii_lowercase())))
}

/// Attributes a search returns for `requested`
fn select_attributes(attrs: &AttributeSet, requested: &[String]) -> AttributeSet {
    if requested.is_empty() || requested.iter().any(|r| r == "*") {
        return attrs.clone();
    }
    attrs
        .iter()
        .filter(|(name, _)| requested.iter().any(|r| r.eq_ignore_ascii_case(name)))
        .map(|(name, values)| (name.clone(), values.clone()))
        .collect()
}

fn refuse(operation: OperationKind, code: ResultCode) -> DirectoryError {
    DirectoryError::server(operation, code, "in-memory server")
}

#[derive(Debug, Default)]
struct Tree {
    entries: BTreeMap<String, DirectoryEntry>,
    admin: (String, String),
    allow_anonymous: bool,
    unreachable: bool,
    failing_deletes: HashSet<String>,
    operations: Vec<(OperationKind, String)>,
    open_sessions: usize,
}

impl Tree {
    fn children(&self, normalized: &str) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries
            .iter()
            .filter(move |(key, _)| parent_of(key) == Some(normalized))
            .map(|(_, entry)| entry)
    }

    fn has_children(&self, normalized: &str) -> bool {
        self.children(normalized).next().is_some()
    }

    fn in_scope(&self, base: &str, scope: SearchScope) -> Vec<&DirectoryEntry> {
        let suffix = format!(",{base}");
        let mut found: Vec<(&String, &DirectoryEntry)> = self
            .entries
            .iter()
            .filter(|(key, _)| match scope {
                SearchScope::Base => key.as_str() == base,
                SearchScope::OneLevel => parent_of(key) == Some(base),
                SearchScope::Subtree => key.as_str() == base || key.ends_with(&suffix),
            })
            .collect();
        found.sort_by_key(|(key, _)| depth(key));
        found.into_iter().map(|(_, entry)| entry).collect()
    }
}

/// Shared state of the fake server; clones observe the same tree
#[derive(Debug, Clone)]
pub struct MemoryServer {
    tree: Arc<Mutex<Tree>>,
}

impl MemoryServer {
    pub fn new(admin_dn: &str, admin_password: &str) -> Self {
        let tree = Tree {
            admin: (normalize(admin_dn), admin_password.to_string()),
            allow_anonymous: true,
            ..Tree::default()
        };
        Self {
            tree: Arc::new(Mutex::new(tree)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap()
    }

    /// Insert an entry directly, bypassing schema and parent checks
    pub fn seed(&self, dn: &str, attrs: AttributeSet) {
        let entry = DirectoryEntry {
            dn: dn.to_string(),
            attributes: attrs,
        };
        self.lock().entries.insert(normalize(dn), entry);
    }

    pub fn set_anonymous_allowed(&self, allowed: bool) {
        self.lock().allow_anonymous = allowed;
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Deletes of `dn` fail with unwillingToPerform
    pub fn fail_deletes_of(&self, dn: &str) {
        self.lock().failing_deletes.insert(normalize(dn));
    }

    pub fn contains(&self, dn: &str) -> bool {
        self.lock().entries.contains_key(&normalize(dn))
    }

    pub fn entry(&self, dn: &str) -> Option<DirectoryEntry> {
        self.lock().entries.get(&normalize(dn)).cloned()
    }

    /// Entries at or below `dn`
    pub fn subtree_size(&self, dn: &str) -> usize {
        self.lock().in_scope(&normalize(dn), SearchScope::Subtree).len()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// DNs of the direct children of `dn`, in original case
    pub fn children_of(&self, dn: &str) -> Vec<String> {
        self.lock().children(&normalize(dn)).map(|entry| entry.dn.clone()).collect()
    }

    pub fn operations(&self) -> Vec<(OperationKind, String)> {
        self.lock().operations.clone()
    }

    pub fn open_sessions(&self) -> usize {
        self.lock().open_sessions
    }
}

/// One connection to a [`MemoryServer`]
pub struct MemoryDirectory {
    server: MemoryServer,
    closed: AtomicBool,
}

impl MemoryDirectory {
    fn open(&self, operation: OperationKind, dn: &str) -> DirectoryResult<MutexGuard<'_, Tree>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DirectoryError::Transport {
                operation,
                message: "connection closed".to_string(),
            });
        }
        let mut tree = self.server.lock();
        tree.operations.push((operation, dn.to_string()));
        Ok(tree)
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn bind(&self, dn: &str, secret: &str) -> DirectoryResult<()> {
        let tree = self.open(OperationKind::Bind, dn)?;
        if dn.is_empty() && secret.is_empty() {
            return if tree.allow_anonymous {
                Ok(())
            } else {
                Err(refuse(OperationKind::Bind, ResultCode::InappropriateAuthentication))
            };
        }
        let (admin_dn, admin_password) = &tree.admin;
        if normalize(dn) == *admin_dn && secret == admin_password {
            Ok(())
        } else {
            Err(refuse(OperationKind::Bind, ResultCode::InvalidCredentials))
        }
    }

    async fn search(&self, request: SearchRequest) -> DirectoryResult<SearchPage> {
        let tree = self.open(OperationKind::Search, &request.base)?;
        let filter = Filter::parse(&request.filter)
            .ok_or_else(|| refuse(OperationKind::Search, ResultCode::ProtocolError))?;

        if request.base.is_empty() && request.scope == SearchScope::Base {
            let naming_contexts: Vec<String> = tree
                .entries
                .iter()
                .filter(|(key, _)| parent_of(key).is_none_or(|parent| !tree.entries.contains_key(parent)))
                .map(|(_, entry)| entry.dn.clone())
                .collect();
            let mut attrs = AttributeSet::new();
            attrs.insert("namingContexts".to_string(), naming_contexts);
            attrs.insert("supportedLDAPVersion".to_string(), vec!["3".to_string()]);
            return Ok(SearchPage {
                entries: vec![DirectoryEntry {
                    dn: String::new(),
                    attributes: select_attributes(&attrs, &request.attributes),
                }],
                next_cursor: None,
            });
        }

        let base = normalize(&request.base);
        if !tree.entries.contains_key(&base) {
            return Err(refuse(OperationKind::Search, ResultCode::NoSuchObject));
        }

        let matched: Vec<DirectoryEntry> = tree
            .in_scope(&base, request.scope)
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .map(|entry| DirectoryEntry {
                dn: entry.dn.clone(),
                attributes: select_attributes(&entry.attributes, &request.attributes),
            })
            .collect();

        let Some(page) = request.page else {
            return Ok(SearchPage {
                entries: matched,
                next_cursor: None,
            });
        };

        let offset: usize = String::from_utf8_lossy(&page.cursor).parse().unwrap_or(0);
        let end = (offset + page.size.max(1) as usize).min(matched.len());
        let next_cursor = (end < matched.len()).then(|| end.to_string().into_bytes());
        Ok(SearchPage {
            entries: matched[offset.min(end)..end].to_vec(),
            next_cursor,
        })
    }

    async fn add(&self, dn: &str, attributes: AttributeSet) -> DirectoryResult<()> {
        let mut tree = self.open(OperationKind::Add, dn)?;
        let key = normalize(dn);
        if tree.entries.contains_key(&key) {
            return Err(refuse(OperationKind::Add, ResultCode::EntryAlreadyExists));
        }
        if let Some(parent) = parent_of(&key) {
            if !tree.entries.contains_key(parent) {
                return Err(refuse(OperationKind::Add, ResultCode::NoSuchObject));
            }
        }
        let is_person = values_of(&attributes, "objectClass")
            .is_some_and(|classes| classes.iter().any(|c| c.eq_ignore_ascii_case("inetOrgPerson")));
        if is_person && values_of(&attributes, "sn").is_none() {
            return Err(refuse(OperationKind::Add, ResultCode::ObjectClassViolation));
        }

        tree.entries.insert(
            key,
            DirectoryEntry {
                dn: dn.to_string(),
                attributes,
            },
        );
        Ok(())
    }

    async fn modify(&self, dn: &str, modifications: Vec<Modification>) -> DirectoryResult<()> {
        let mut tree = self.open(OperationKind::Modify, dn)?;
        let entry = tree
            .entries
            .get_mut(&normalize(dn))
            .ok_or_else(|| refuse(OperationKind::Modify, ResultCode::NoSuchObject))?;

        // Applied to a copy so a rejected change leaves the entry untouched
        let mut attrs = entry.attributes.clone();
        for change in modifications {
            match change.kind {
                ModifyKind::Add => match values_of_mut(&mut attrs, &change.attribute) {
                    Some(values) => values.extend(change.values),
                    None => {
                        attrs.insert(change.attribute, change.values);
                    }
                },
                ModifyKind::Replace => {
                    remove_attribute(&mut attrs, &change.attribute);
                    if !change.values.is_empty() {
                        attrs.insert(change.attribute, change.values);
                    }
                }
                ModifyKind::Delete if change.values.is_empty() => {
                    if !remove_attribute(&mut attrs, &change.attribute) {
                        return Err(refuse(OperationKind::Modify, ResultCode::NoSuchAttribute));
                    }
                }
                ModifyKind::Delete => {
                    let values = values_of_mut(&mut attrs, &change.attribute)
                        .ok_or_else(|| refuse(OperationKind::Modify, ResultCode::NoSuchAttribute))?;
                    values.retain(|v| !change.values.contains(v));
                    if values.is_empty() {
                        remove_attribute(&mut attrs, &change.attribute);
                    }
                }
            }
        }
        entry.attributes = attrs;
        Ok(())
    }

    async fn compare(&self, dn: &str, attribute: &str, value: &str) -> DirectoryResult<bool> {
        let tree = self.open(OperationKind::Compare, dn)?;
        let entry = tree
            .entries
            .get(&normalize(dn))
            .ok_or_else(|| refuse(OperationKind::Compare, ResultCode::NoSuchObject))?;
        let values = values_of(&entry.attributes, attribute)
            .ok_or_else(|| refuse(OperationKind::Compare, ResultCode::NoSuchAttribute))?;
        Ok(values.iter().any(|v| v.eq_ignore_ascii_case(value)))
    }

    async fn delete(&self, dn: &str) -> DirectoryResult<()> {
        let mut tree = self.open(OperationKind::Delete, dn)?;
        let key = normalize(dn);
        if !tree.entries.contains_key(&key) {
            return Err(refuse(OperationKind::Delete, ResultCode::NoSuchObject));
        }
        if tree.has_children(&key) {
            return Err(refuse(OperationKind::Delete, ResultCode::NotAllowedOnNonLeaf));
        }
        if tree.failing_deletes.contains(&key) {
            return Err(refuse(OperationKind::Delete, ResultCode::UnwillingToPerform));
        }
        tree.entries.remove(&key);
        Ok(())
    }

    async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        delete_old_rdn: bool,
        new_superior: Option<String>,
    ) -> DirectoryResult<()> {
        let mut tree = self.open(OperationKind::ModifyDn, dn)?;
        let key = normalize(dn);
        if !tree.entries.contains_key(&key) {
            return Err(refuse(OperationKind::ModifyDn, ResultCode::NoSuchObject));
        }
        if tree.has_children(&key) {
            return Err(refuse(OperationKind::ModifyDn, ResultCode::NotAllowedOnNonLeaf));
        }

        let original_parent = dn.split_once(',').map(|(_, parent)| parent.trim().to_string()).unwrap_or_default();
        let superior = new_superior.unwrap_or(original_parent);
        if !tree.entries.contains_key(&normalize(&superior)) {
            return Err(refuse(OperationKind::ModifyDn, ResultCode::NoSuchObject));
        }
        let new_dn = format!("{new_rdn},{superior}");
        let new_key = normalize(&new_dn);
        if tree.entries.contains_key(&new_key) {
            return Err(refuse(OperationKind::ModifyDn, ResultCode::EntryAlreadyExists));
        }

        let Some(mut entry) = tree.entries.remove(&key) else {
            return Err(refuse(OperationKind::ModifyDn, ResultCode::NoSuchObject));
        };
        let old_rdn = dn.split(',').next().unwrap_or_default();
        if delete_old_rdn {
            if let Some((attr, value)) = old_rdn.split_once('=') {
                if let Some(values) = values_of_mut(&mut entry.attributes, attr.trim()) {
                    values.retain(|v| !v.eq_ignore_ascii_case(value.trim()));
                }
            }
        }
        if let Some((attr, value)) = new_rdn.split_once('=') {
            match values_of_mut(&mut entry.attributes, attr.trim()) {
                Some(values) if !values.iter().any(|v| v.eq_ignore_ascii_case(value.trim())) => {
                    values.push(value.trim().to_string())
                }
                Some(_) => {}
                None => {
                    entry
                        .attributes
                        .insert(attr.trim().to_string(), vec![value.trim().to_string()]);
                }
            }
        }
        entry.dn = new_dn;
        tree.entries.insert(new_key, entry);
        Ok(())
    }

    async fn unbind(&self) -> DirectoryResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let mut tree = self.server.lock();
            tree.open_sessions = tree.open_sessions.saturating_sub(1);
            tree.operations.push((OperationKind::Unbind, String::new()));
        }
        Ok(())
    }
}

/// Hands out sessions on a [`MemoryServer`]
pub struct MemoryConnector {
    server: MemoryServer,
}

impl MemoryConnector {
    pub fn new(server: MemoryServer) -> Self {
        Self { server }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    fn address(&self) -> String {
        "ldap://memory:389".to_string()
    }

    async fn connect(&self) -> DirectoryResult<DirectoryHandle> {
        {
            let mut tree = self.server.lock();
            if tree.unreachable {
                return Err(DirectoryError::Connect {
                    address: self.address(),
                    message: "connection refused".to_string(),
                });
            }
            tree.open_sessions += 1;
        }
        Ok(Arc::new(MemoryDirectory {
            server: self.server.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

#[test]
fn test_filter_parser_handles_nesting_and_wildcards() {
    let filter = Filter::parse("(&(objectClass=organizationalUnit)(ou=ldap-test-*))").unwrap();
    assert_eq!(
        filter,
        Filter::And(vec![
            Filter::Equal("objectClass".to_string(), "organizationalunit".to_string()),
            Filter::Prefix("ou".to_string(), "ldap-test-".to_string()),
        ])
    );
    assert_eq!(Filter::parse("(objectClass=*)"), Some(Filter::Present("objectClass".to_string())));
    assert_eq!(Filter::parse("(cn=x"), None);
}
