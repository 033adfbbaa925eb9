//! Modify the test user's attributes

use directory::{Modification, ResultCode};
use shared::{OperationKind, component_trace};

use super::SuiteContext;
use crate::core::{Scenario, TestOutcome};

pub async fn run(ctx: &SuiteContext) -> Vec<TestOutcome> {
    vec![
        modify_add_attribute(ctx).await,
        modify_replace_attribute(ctx).await,
        modify_delete_attribute(ctx).await,
        modify_multiple(ctx).await,
        modify_missing_entry(ctx).await,
    ]
}

async fn modify_user(ctx: &SuiteContext, name: &str, changes: Vec<Modification>, failure: &str, success: &str) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Modify, name);
    let dn = ctx.test_user_dn();
    component_trace!(scenario.component(), dn = %dn, changes = ?changes, "Operation: Modify");

    let result = ctx.directory.modify(&dn, changes).await;
    scenario.expect_success(&result, failure, |_| success.to_string())
}

async fn modify_add_attribute(ctx: &SuiteContext) -> TestOutcome {
    modify_user(
        ctx,
        "Modify - Add Attribute Test",
        vec![Modification::add("telephoneNumber", &["+1-555-0100"])],
        "Failed to add attribute",
        "Successfully added telephoneNumber attribute",
    )
    .await
}

async fn modify_replace_attribute(ctx: &SuiteContext) -> TestOutcome {
    modify_user(
        ctx,
        "Modify - Replace Attribute Test",
        vec![Modification::replace("mail", &["newemail@example.com"])],
        "Failed to replace attribute",
        "Successfully replaced mail attribute",
    )
    .await
}

async fn modify_delete_attribute(ctx: &SuiteContext) -> TestOutcome {
    modify_user(
        ctx,
        "Modify - Delete Attribute Test",
        vec![Modification::delete("telephoneNumber", &[])],
        "Failed to delete attribute",
        "Successfully deleted telephoneNumber attribute",
    )
    .await
}

async fn modify_multiple(ctx: &SuiteContext) -> TestOutcome {
    modify_user(
        ctx,
        "Modify - Multiple Modifications Test",
        vec![
            Modification::add("mobile", &["+1-555-0200"]),
            Modification::replace("description", &["Modified test user with multiple changes"]),
        ],
        "Failed to apply multiple modifications",
        "Successfully applied multiple modifications",
    )
    .await
}

async fn modify_missing_entry(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Modify, "Modify - Non-Existent Entry Test (Negative)");
    let changes = vec![Modification::replace("description", &["This should fail"])];
    let result = ctx.directory.modify(&ctx.child("cn=nonexistent"), changes).await;
    scenario.expect_rejection(
        &result,
        ResultCode::NoSuchObject,
        "Correctly rejected modification of non-existent entry",
        "modification of non-existent entry succeeded",
    )
}
