//! Modify DN: rename, move, rename+move and a collision
//!
//! Every scenario creates its own subject first. Both the original name and
//! the post-rename name are tracked; cleanup treats the stale one as absent.

use directory::{DirectoryResult, ResultCode, attributes};
use shared::{OperationKind, component_warn};

use super::SuiteContext;
use crate::core::{EntryKind, Scenario, TestOutcome};

pub const TARGET_OU: &str = "target-ou";
pub const RENAMED_CN: &str = "renamed-user";

pub async fn run(ctx: &SuiteContext) -> Vec<TestOutcome> {
    vec![
        rename_entry(ctx).await,
        move_entry(ctx).await,
        rename_and_move(ctx).await,
        rename_to_existing(ctx).await,
    ]
}

/// Create a throwaway person under the test root and track it
async fn create_subject(ctx: &SuiteContext, cn: &str, sn: &str) -> DirectoryResult<String> {
    let dn = ctx.child(&format!("cn={cn}"));
    let attrs = attributes(&[("objectClass", &["inetOrgPerson"]), ("cn", &[cn]), ("sn", &[sn])]);
    let result = ctx.directory.add(&dn, attrs).await;
    ctx.track_unless_refused(&result, &dn, EntryKind::Principal);
    result.map(|()| dn)
}

fn target_ou_dn(ctx: &SuiteContext) -> String {
    ctx.child(&format!("ou={TARGET_OU}"))
}

async fn rename_entry(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::ModifyDn, "Modify DN - Rename Entry Test");
    let old_dn = match create_subject(ctx, "rename-test-user", "RenameTest").await {
        Ok(dn) => dn,
        Err(e) => return scenario.fail_with("Failed to create test entry", &e),
    };

    let new_rdn = format!("cn={RENAMED_CN}");
    let new_dn = ctx.child(&new_rdn);
    let result = ctx.directory.rename(&old_dn, &new_rdn, true, None).await;
    ctx.track_unless_refused(&result, &new_dn, EntryKind::Principal);
    scenario.expect_success(&result, "Failed to rename entry", |_| {
        format!("Successfully renamed entry from {old_dn} to {new_dn}")
    })
}

async fn move_entry(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::ModifyDn, "Modify DN - Move Entry Test");

    let target = target_ou_dn(ctx);
    let ou_attrs = attributes(&[("objectClass", &["organizationalUnit"]), ("ou", &[TARGET_OU])]);
    let created = ctx.directory.add(&target, ou_attrs).await;
    ctx.track_unless_refused(&created, &target, EntryKind::Container);
    if let Err(e) = created {
        component_warn!(scenario.component(), "Failed to create target OU (may already exist): {e}");
    }

    let cn = "move-test-user";
    let old_dn = match create_subject(ctx, cn, "MoveTest").await {
        Ok(dn) => dn,
        Err(e) => return scenario.fail_with("Failed to create test entry", &e),
    };

    // Same RDN, new superior
    let rdn = format!("cn={cn}");
    let new_dn = format!("{rdn},{target}");
    let result = ctx.directory.rename(&old_dn, &rdn, true, Some(target.clone())).await;
    ctx.track_unless_refused(&result, &new_dn, EntryKind::Principal);
    scenario.expect_success(&result, "Failed to move entry", |_| {
        format!("Successfully moved entry from {old_dn} to {new_dn}")
    })
}

async fn rename_and_move(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::ModifyDn, "Modify DN - Rename and Move Entry Test");
    let old_dn = match create_subject(ctx, "rename-move-user", "RenameMoveTest").await {
        Ok(dn) => dn,
        Err(e) => return scenario.fail_with("Failed to create test entry", &e),
    };

    let target = target_ou_dn(ctx);
    let new_rdn = "cn=renamed-moved-user";
    let new_dn = format!("{new_rdn},{target}");
    let result = ctx.directory.rename(&old_dn, new_rdn, true, Some(target)).await;
    ctx.track_unless_refused(&result, &new_dn, EntryKind::Principal);
    scenario.expect_success(&result, "Failed to rename and move entry", |_| {
        format!("Successfully renamed and moved entry from {old_dn} to {new_dn}")
    })
}

async fn rename_to_existing(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::ModifyDn, "Modify DN - Rename to Existing DN Test (Negative)");
    let new_rdn = format!("cn={RENAMED_CN}");
    let result = ctx.directory.rename(&ctx.test_user_dn(), &new_rdn, true, None).await;
    // On success testuser lives under the colliding name
    ctx.track_unless_refused(&result, &ctx.child(&new_rdn), EntryKind::Principal);
    scenario.expect_rejection(
        &result,
        ResultCode::EntryAlreadyExists,
        "Correctly rejected rename to existing DN",
        "rename to existing DN succeeded",
    )
}
