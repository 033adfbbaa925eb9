//! Abandon and Unbind
//!
//! The client library gives no handle on an in-flight message id, so the
//! abandon scenario races a broad search against a deadline and drops the
//! search task if the deadline wins. Unbind runs on a spare connection so the
//! live one stays usable for cleanup.

use directory::{SearchRequest, SearchScope};
use shared::{OperationKind, component_debug, component_warn};

use super::SuiteContext;
use crate::core::{Scenario, TestOutcome};

pub async fn run(ctx: &SuiteContext) -> Vec<TestOutcome> {
    vec![abandon_search(ctx).await, unbind(ctx).await]
}

async fn abandon_search(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Abandon, "Abandon - Cancel Search Operation Test");

    let request = SearchRequest::new(&ctx.base_dn, SearchScope::Subtree, "(objectClass=*)").with_attributes(&["*"]);
    let directory = ctx.directory.clone();
    let mut search = tokio::spawn(async move { directory.search(request).await });

    tokio::select! {
        joined = &mut search => {
            match joined {
                Ok(Ok(page)) => component_debug!(scenario.component(), entries = page.entries.len(), "Search finished before abandon"),
                Ok(Err(e)) => component_debug!(scenario.component(), "Search ended with error: {e}"),
                Err(e) => component_debug!(scenario.component(), "Search task ended abnormally: {e}"),
            }
            component_warn!(
                scenario.component(),
                "Abandon is not issued on the wire; the search completed before it could be cancelled"
            );
            scenario.pass("Abandon operation test completed (search finished before the abandon deadline)")
        }
        _ = tokio::time::sleep(ctx.abandon_wait) => {
            search.abort();
            scenario.pass("Abandon test completed (search timed out as expected)")
        }
    }
}

async fn unbind(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Unbind, "Unbind Operation Test");

    let spare = match ctx.connector.connect().await {
        Ok(spare) => spare,
        Err(e) => return scenario.fail_with("Failed to connect to server for test", &e),
    };
    if let Err(e) = spare
        .bind(&ctx.credentials.bind_dn, &ctx.credentials.bind_password)
        .await
    {
        if let Err(close) = spare.unbind().await {
            component_debug!(scenario.component(), "Spare connection close reported: {close}");
        }
        return scenario.fail_with(format!("Failed to bind spare connection: {e}"), &e);
    }

    match spare.unbind().await {
        Ok(()) => scenario.pass("Successfully sent unbind request and closed connection"),
        Err(e) => scenario.fail_with(format!("Unbind failed: {e}"), &e),
    }
}
