//! Delete: a leaf, a non-leaf and a missing entry

use directory::{ResultCode, attributes};
use shared::OperationKind;

use super::SuiteContext;
use crate::core::{EntryKind, Scenario, TestOutcome};

pub async fn run(ctx: &SuiteContext) -> Vec<TestOutcome> {
    vec![
        delete_leaf(ctx).await,
        delete_non_leaf(ctx).await,
        delete_missing(ctx).await,
    ]
}

async fn delete_leaf(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Delete, "Delete - Leaf Entry Test");
    let dn = ctx.child("cn=delete-test-user");
    let attrs = attributes(&[
        ("objectClass", &["inetOrgPerson"]),
        ("cn", &["delete-test-user"]),
        ("sn", &["DeleteTest"]),
    ]);
    if let Err(e) = ctx.directory.add(&dn, attrs).await {
        if e.is_indeterminate() {
            ctx.tracker.track(dn, EntryKind::Principal);
        }
        return scenario.fail_with("Failed to create test entry", &e);
    }

    match ctx.directory.delete(&dn).await {
        Ok(()) => scenario.pass(format!("Successfully deleted entry: {dn}")),
        Err(e) => {
            // Still there, so cleanup has to remove it
            ctx.tracker.track(dn, EntryKind::Principal);
            scenario.fail_with(format!("Failed to delete entry: {e}"), &e)
        }
    }
}

async fn delete_non_leaf(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Delete, "Delete - Non-Leaf Entry Test (Negative)");
    let result = ctx.directory.delete(&ctx.test_root).await;
    scenario.expect_rejection(
        &result,
        ResultCode::NotAllowedOnNonLeaf,
        "Correctly rejected deletion of non-leaf entry",
        "non-leaf entry was deleted",
    )
}

async fn delete_missing(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Delete, "Delete - Non-Existent Entry Test (Negative)");
    let result = ctx.directory.delete(&ctx.child("cn=nonexistent-delete-test")).await;
    scenario.expect_rejection(
        &result,
        ResultCode::NoSuchObject,
        "Correctly rejected deletion of non-existent entry",
        "deletion of non-existent entry succeeded",
    )
}
