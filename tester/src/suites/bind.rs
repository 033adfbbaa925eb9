//! Bind: valid credentials, wrong password, anonymous

use directory::{DirectoryHandle, ResultCode};
use shared::{OperationKind, component_debug};

use super::SuiteContext;
use crate::core::{Scenario, TestOutcome};

const INVALID_PASSWORD: &str = "INVALID_PASSWORD_12345";

pub async fn run(ctx: &SuiteContext) -> Vec<TestOutcome> {
    vec![valid_bind(ctx).await, invalid_bind(ctx).await, anonymous_bind(ctx).await]
}

async fn valid_bind(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Bind, "Valid Bind Test");
    let result = ctx
        .directory
        .bind(&ctx.credentials.bind_dn, &ctx.credentials.bind_password)
        .await;
    scenario.expect_success(&result, "Failed to bind with valid credentials", |_| {
        "Successfully authenticated with valid credentials".to_string()
    })
}

/// Close a spare connection; errors are irrelevant to the scenario
async fn release(spare: DirectoryHandle) {
    if let Err(e) = spare.unbind().await {
        component_debug!(
            shared::Component::Suite(OperationKind::Bind),
            "Spare connection close reported: {e}"
        );
    }
}

async fn invalid_bind(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Bind, "Invalid Bind Test");

    let spare = match ctx.connector.connect().await {
        Ok(spare) => spare,
        Err(e) => return scenario.fail_with("Failed to connect to server for test", &e),
    };

    component_debug!(
        scenario.component(),
        dn = %ctx.credentials.bind_dn,
        "Attempting bind with invalid credentials"
    );
    let result = spare.bind(&ctx.credentials.bind_dn, INVALID_PASSWORD).await;
    release(spare).await;

    match result {
        Err(e) if e.has_code(ResultCode::InvalidCredentials) => {
            scenario.pass("Correctly rejected invalid credentials")
        }
        Err(e) => scenario.pass(format!("Bind failed as expected (error: {e})")),
        Ok(()) => scenario.fail("ERROR: operation unexpectedly succeeded (invalid credentials were accepted, security issue!)"),
    }
}

async fn anonymous_bind(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Bind, "Anonymous Bind Test");

    let spare = match ctx.connector.connect().await {
        Ok(spare) => spare,
        Err(e) => return scenario.fail_with("Failed to connect to server for test", &e),
    };

    component_debug!(scenario.component(), "Attempting anonymous bind");
    let result = spare.bind("", "").await;
    release(spare).await;

    match result {
        Ok(()) => scenario.pass("Anonymous bind permitted on this server"),
        Err(e) => scenario.pass(format!("Anonymous bind not permitted (as expected): {e}")),
    }
}
