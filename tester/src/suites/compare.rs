//! Compare against the test user

use directory::ResultCode;
use shared::OperationKind;

use super::SuiteContext;
use crate::core::{Scenario, TestOutcome};

pub async fn run(ctx: &SuiteContext) -> Vec<TestOutcome> {
    vec![
        compare_matching(ctx).await,
        compare_non_matching(ctx).await,
        compare_missing_entry(ctx).await,
        compare_missing_attribute(ctx).await,
    ]
}

async fn compare_matching(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Compare, "Compare - Matching Value Test");
    let (attribute, value) = ("cn", "testuser");

    match ctx.directory.compare(&ctx.test_user_dn(), attribute, value).await {
        Ok(true) => scenario.pass(format!("Attribute {attribute} matches value '{value}' (as expected)")),
        Ok(false) => scenario.fail(format!("Attribute {attribute} does not match value '{value}' (unexpected)")),
        Err(e) => scenario.fail_with(format!("Compare operation failed: {e}"), &e),
    }
}

async fn compare_non_matching(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Compare, "Compare - Non-Matching Value Test");
    let (attribute, value) = ("cn", "wrongvalue");

    match ctx.directory.compare(&ctx.test_user_dn(), attribute, value).await {
        Ok(false) => scenario.pass(format!("Attribute {attribute} does not match value '{value}' (as expected)")),
        Ok(true) => scenario.fail(format!("Attribute {attribute} unexpectedly matches value '{value}'")),
        Err(e) => scenario.fail_with(format!("Compare operation failed: {e}"), &e),
    }
}

async fn compare_missing_entry(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Compare, "Compare - Non-Existent Entry Test (Negative)");
    let result = ctx.directory.compare(&ctx.child("cn=nonexistent"), "cn", "nonexistent").await;
    scenario.expect_rejection(
        &result,
        ResultCode::NoSuchObject,
        "Correctly returned error for non-existent entry",
        "compare succeeded on non-existent entry",
    )
}

async fn compare_missing_attribute(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Compare, "Compare - Non-Existent Attribute Test (Negative)");

    // Servers either reject the assertion or answer compareFalse; both are correct
    match ctx
        .directory
        .compare(&ctx.test_user_dn(), "nonExistentAttribute", "test")
        .await
    {
        Err(e) => scenario.pass(format!("Correctly returned error for non-existent attribute ({e})")),
        Ok(false) => scenario.pass("Correctly returned false for non-existent attribute"),
        Ok(true) => scenario.fail("ERROR: Compare returned true for non-existent attribute"),
    }
}
