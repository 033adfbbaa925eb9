//! Add: container, principal, group, plus duplicate and incomplete entries

use directory::{AttributeSet, ResultCode, attributes};
use shared::OperationKind;

use super::{SuiteContext, TEST_USER_CN};
use crate::core::{EntryKind, Scenario, TestOutcome};

pub const TEST_OU: &str = "test-ou";
pub const TEST_GROUP_CN: &str = "testgroup";
pub const TEST_USER_MAIL: &str = "testuser@example.com";

pub async fn run(ctx: &SuiteContext) -> Vec<TestOutcome> {
    vec![
        add_ou(ctx).await,
        add_user(ctx).await,
        add_group(ctx).await,
        add_duplicate(ctx).await,
        add_missing_attributes(ctx).await,
    ]
}

/// Attributes of the shared test user
pub fn test_user_attributes() -> AttributeSet {
    attributes(&[
        ("objectClass", &["inetOrgPerson"]),
        ("cn", &[TEST_USER_CN]),
        ("sn", &["User"]),
        ("givenName", &["Test"]),
        ("mail", &[TEST_USER_MAIL]),
        ("userPassword", &["TestPassword123!"]),
        ("description", &["Test user created by automated tests"]),
    ])
}

async fn add_tracked(
    ctx: &SuiteContext,
    scenario: Scenario,
    dn: String,
    attrs: AttributeSet,
    kind: EntryKind,
    what: &str,
) -> TestOutcome {
    tracing::trace!(component = %scenario.component(), dn = %dn, attributes = ?attrs, "Operation: Add");
    let result = ctx.directory.add(&dn, attrs).await;
    ctx.track_unless_refused(&result, &dn, kind);
    scenario.expect_success(&result, &format!("Failed to add {what}"), |_| {
        format!("Successfully added {what}: {dn}")
    })
}

async fn add_ou(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Add, "Add OU Test");
    let dn = ctx.child(&format!("ou={TEST_OU}"));
    let attrs = attributes(&[
        ("objectClass", &["organizationalUnit"]),
        ("ou", &[TEST_OU]),
        ("description", &["Test organizational unit created by automated tests"]),
    ]);
    add_tracked(ctx, scenario, dn, attrs, EntryKind::Container, "OU").await
}

async fn add_user(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Add, "Add User Test");
    add_tracked(
        ctx,
        scenario,
        ctx.test_user_dn(),
        test_user_attributes(),
        EntryKind::Principal,
        "user",
    )
    .await
}

async fn add_group(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Add, "Add Group Test");
    let dn = ctx.child(&format!("cn={TEST_GROUP_CN}"));
    let member = ctx.test_user_dn();
    let attrs = attributes(&[
        ("objectClass", &["groupOfNames"]),
        ("cn", &[TEST_GROUP_CN]),
        ("description", &["Test group created by automated tests"]),
        ("member", &[member.as_str()]),
    ]);
    add_tracked(ctx, scenario, dn, attrs, EntryKind::Group, "group").await
}

async fn add_duplicate(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(OperationKind::Add, "Add Duplicate Entry Test (Negative)");
    let attrs = attributes(&[
        ("objectClass", &["inetOrgPerson"]),
        ("cn", &[TEST_USER_CN]),
        ("sn", &["User"]),
    ]);
    let result = ctx.directory.add(&ctx.test_user_dn(), attrs).await;
    scenario.expect_rejection(
        &result,
        ResultCode::EntryAlreadyExists,
        "Correctly rejected duplicate entry",
        "duplicate entry was accepted",
    )
}

async fn add_missing_attributes(ctx: &SuiteContext) -> TestOutcome {
    let scenario = Scenario::start(
        OperationKind::Add,
        "Add Entry with Missing Required Attributes Test (Negative)",
    );
    let dn = ctx.child("cn=incomplete-user");
    // inetOrgPerson without its required sn
    let attrs = attributes(&[("objectClass", &["inetOrgPerson"]), ("cn", &["incomplete-user"])]);
    let result = ctx.directory.add(&dn, attrs).await;
    ctx.track_unless_refused(&result, &dn, EntryKind::Principal);
    scenario.expect_rejection(
        &result,
        ResultCode::ObjectClassViolation,
        "Correctly rejected entry with missing required attributes",
        "entry with missing required attributes was accepted",
    )
}
