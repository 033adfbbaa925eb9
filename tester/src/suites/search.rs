//! Search: scopes, filters, attribute selection and paging

use directory::{DirectoryResult, SearchPage, SearchRequest, SearchScope};
use shared::{OperationKind, component_debug, component_trace, logging};
use std::time::Instant;

use super::{SuiteContext, TEST_USER_CN};
use crate::core::{Scenario, TestOutcome};

pub const PAGE_SIZE: i32 = 10;

/// Upper bound on round-trips for one paged search
pub const MAX_PAGES: usize = 10_000;

const ANY_OBJECT: &str = "(objectClass=*)";

pub async fn run(ctx: &SuiteContext) -> Vec<TestOutcome> {
    vec![
        search_base(ctx).await,
        search_one_level(ctx).await,
        search_subtree(ctx).await,
        search_with_filter(ctx).await,
        search_with_attributes(ctx).await,
        search_with_paging(ctx).await,
    ]
}

async fn search(scenario: &Scenario, request: SearchRequest, ctx: &SuiteContext) -> DirectoryResult<SearchPage> {
    logging::log_search_request(
        scenario.component(),
        &request.base,
        &request.filter,
        &request.scope.to_string(),
        &request.attributes,
    );
    let started = Instant::now();
    let result = ctx.directory.search(request).await;
    if let Ok(page) = &result {
        logging::log_search_result(scenario.component(), page.entries.len(), started.elapsed());
    }
    result
}

async fn scoped_search(ctx: &SuiteContext, name: &str, scope: SearchScope, attrs: &[&str], label: &str) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Search, name);
    let request = SearchRequest::new(&ctx.test_root, scope, ANY_OBJECT).with_attributes(attrs);
    let result = search(&scenario, request, ctx).await;

    if let Ok(page) = &result {
        for (i, entry) in page.entries.iter().take(5).enumerate() {
            component_trace!(scenario.component(), "  [{}] {}", i + 1, entry.dn);
        }
    }
    scenario.expect_success(&result, "Search failed", |page| {
        format!("Found {} entries ({label})", page.entries.len())
    })
}

async fn search_base(ctx: &SuiteContext) -> TestOutcome {
    scoped_search(ctx, "Search with Base Scope Test", SearchScope::Base, &["*"], "base scope").await
}

async fn search_one_level(ctx: &SuiteContext) -> TestOutcome {
    scoped_search(
        ctx,
        "Search with One Level Scope Test",
        SearchScope::OneLevel,
        &["cn", "ou", "objectClass"],
        "one level scope",
    )
    .await
}

async fn search_subtree(ctx: &SuiteContext) -> TestOutcome {
    scoped_search(ctx, "Search with Subtree Scope Test", SearchScope::Subtree, &["dn"], "subtree scope").await
}

async fn search_with_filter(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Search, "Search with Filter Test");
    let request = SearchRequest::new(&ctx.test_root, SearchScope::Subtree, "(objectClass=inetOrgPerson)")
        .with_attributes(&["cn", "mail", "sn"]);
    let result = search(&scenario, request, ctx).await;

    if let Ok(page) = &result {
        for entry in &page.entries {
            component_trace!(scenario.component(), dn = %entry.dn, cn = ?entry.first_value("cn"), "Entry found");
        }
    }
    scenario.expect_success(&result, "Search failed", |page| {
        format!("Found {} inetOrgPerson entries with filter", page.entries.len())
    })
}

/// Attribute names returned that were not requested
pub fn unrequested_attributes<'a>(returned: impl IntoIterator<Item = &'a String>, requested: &[&str]) -> Vec<String> {
    returned
        .into_iter()
        .filter(|name| !requested.iter().any(|r| r.eq_ignore_ascii_case(name)))
        .cloned()
        .collect()
}

async fn search_with_attributes(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Search, "Search with Attribute Selection Test");
    let requested = ["cn", "mail"];
    let request = SearchRequest::new(&ctx.test_root, SearchScope::Subtree, format!("(cn={TEST_USER_CN})"))
        .with_attributes(&requested);

    match search(&scenario, request, ctx).await {
        Err(e) => scenario.fail_with(format!("Search failed: {e}"), &e),
        Ok(page) => match page.entries.first() {
            // Servers that return extra attributes are logged, not failed
            Some(entry) => {
                let extra = unrequested_attributes(entry.attributes.keys(), &requested);
                for name in &extra {
                    component_debug!(scenario.component(), attribute = %name, "Unexpected attribute in result");
                }
                component_trace!(
                    scenario.component(),
                    cn = ?entry.first_value("cn"),
                    mail = ?entry.first_value("mail"),
                    "Retrieved attributes"
                );
                scenario.pass(format!(
                    "Found entries with attribute selection (attributes filtered: {})",
                    extra.is_empty()
                ))
            }
            None => scenario.pass("No entries found matching filter (expected if test user doesn't exist yet)"),
        },
    }
}

/// Totals of a completed paged search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagedTotals {
    pub entries: usize,
    pub pages: usize,
}

/// Follow the paging cursor until the server reports no more pages
///
/// Stops after `max_pages` round-trips; the returned totals then cover only
/// the pages read, and `complete` in the tuple is false.
pub async fn paged_search(
    ctx: &SuiteContext,
    scenario: &Scenario,
    base: &str,
    max_pages: usize,
) -> DirectoryResult<(PagedTotals, bool)> {
    let mut totals = PagedTotals { entries: 0, pages: 0 };
    let mut cursor = Vec::new();

    while totals.pages < max_pages {
        let request = SearchRequest::new(base, SearchScope::Subtree, ANY_OBJECT)
            .with_attributes(&["dn"])
            .with_page(PAGE_SIZE, cursor);
        let page = search(scenario, request, ctx).await?;

        totals.pages += 1;
        totals.entries += page.entries.len();
        component_trace!(
            scenario.component(),
            "Page {}: {} entries",
            totals.pages,
            page.entries.len()
        );

        match page.next_cursor {
            Some(next) if !next.is_empty() => cursor = next,
            _ => return Ok((totals, true)),
        }
    }
    Ok((totals, false))
}

async fn search_with_paging(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Search, "Search with Paging Test");
    component_debug!(scenario.component(), page_size = PAGE_SIZE, "Using paging");

    match paged_search(ctx, &scenario, &ctx.base_dn, MAX_PAGES).await {
        Ok((totals, true)) => scenario.pass(format!(
            "Paged search completed: {} entries across {} pages",
            totals.entries, totals.pages
        )),
        Ok((totals, false)) => scenario.fail(format!(
            "Paged search did not finish after {} pages ({} entries read)",
            totals.pages, totals.entries
        )),
        Err(e) => scenario.fail_with(format!("Paged search failed: {e}"), &e),
    }
}
