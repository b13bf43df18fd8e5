//! Organizer approval by administrators and application decisions

use assert_matches::assert_matches;
use serial_test::serial;

use StallBoard::database::{tables, StoreOp};
use StallBoard::models::{ApplicationStatus, Decision};
use StallBoard::StallBoardError;

use crate::helpers::*;

const ORG: &str = "org-1";

#[tokio::test]
#[serial]
async fn test_admin_approves_and_revokes_organizers() {
    let ctx = TestContext::new().await;
    ctx.seed(
        tables::ORGANIZERS,
        vec![organizer_row("org-a", "Ua", true), organizer_row("org-b", "Ub", false)],
    );
    let (admin, _) = ctx.sign_in(ADMIN_USER_ID).await;
    assert!(ctx.services.auth_service.require_admin(&admin).is_ok());
    let approvals = &ctx.services.approval_service;

    let listed = approvals.list_organizers(&admin).await.unwrap();
    assert_eq!(listed[0].id, "org-b");
    assert_eq!(approvals.pending_organizers(&admin).await.unwrap().len(), 1);

    let listed = approvals.set_organizer_approval(&admin, "org-b", true).await.unwrap();
    assert!(listed.iter().all(|o| o.is_approved));
    assert!(approvals.pending_organizers(&admin).await.unwrap().is_empty());

    let listed = approvals.set_organizer_approval(&admin, "org-a", false).await.unwrap();
    assert_eq!(listed[0].id, "org-a");
    assert!(!listed[0].is_approved);

    assert_matches!(
        approvals.set_organizer_approval(&admin, "org-missing", true).await,
        Err(StallBoardError::OrganizerNotFound { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_non_admins_are_kept_out_of_the_admin_console() {
    let ctx = TestContext::new().await;
    let (session, _) = ctx.sign_in(OWNER_USER_ID).await;

    assert!(!ctx.services.auth_service.is_admin(&session));
    assert_matches!(
        ctx.services.auth_service.require_admin(&session),
        Err(StallBoardError::PermissionDenied(_))
    );
    assert_matches!(
        ctx.services.auth_service.require_admin(&StallBoard::Session::Anonymous),
        Err(StallBoardError::NotAuthenticated)
    );
}

#[tokio::test]
#[serial]
async fn test_non_admins_cannot_list_or_approve_organizers() {
    let ctx = TestContext::new().await;
    ctx.seed(tables::ORGANIZERS, vec![organizer_row("org-b", "Ub", false)]);
    let (owner, _) = ctx.sign_in(OWNER_USER_ID).await;
    let approvals = &ctx.services.approval_service;

    assert_matches!(
        approvals.set_organizer_approval(&owner, "org-b", true).await,
        Err(StallBoardError::PermissionDenied(_))
    );
    assert_matches!(
        approvals.set_organizer_approval(&StallBoard::Session::Anonymous, "org-b", true).await,
        Err(StallBoardError::NotAuthenticated)
    );
    assert_matches!(
        approvals.list_organizers(&owner).await,
        Err(StallBoardError::PermissionDenied(_))
    );
    assert_matches!(
        approvals.pending_organizers(&owner).await,
        Err(StallBoardError::PermissionDenied(_))
    );

    assert_eq!(ctx.count(StoreOp::Update, tables::ORGANIZERS), 0);
    assert_eq!(ctx.rows(tables::ORGANIZERS)[0]["is_approved"], false);
}

fn seed_applications(ctx: &TestContext) {
    ctx.seed(tables::ORGANIZERS, vec![organizer_row(ORG, OWNER_USER_ID, true)]);
    ctx.seed(
        tables::ORGANIZER_MEMBERS,
        vec![
            member_row(ORG, "Uadminrole", "admin"),
            member_row(ORG, MEMBER_USER_ID, "member"),
        ],
    );
    ctx.seed(
        tables::EVENTS,
        vec![
            event_row("ev-1", ORG, "2026-11-20", None, true),
            event_row("ev-other", "org-2", "2026-11-20", None, true),
        ],
    );
    ctx.seed(
        tables::EXHIBITORS,
        vec![exhibitor_row("ex-1", STORE_USER_ID), exhibitor_row("ex-2", "Ustore2")],
    );
    ctx.seed(
        tables::EVENT_APPLICATIONS,
        vec![
            application_row("app-1", "ev-1", "ex-1", "pending"),
            application_row("app-2", "ev-1", "ex-2", "pending"),
            application_row("app-3", "ev-other", "ex-1", "pending"),
        ],
    );
}

#[tokio::test]
#[serial]
async fn test_organizer_sees_only_its_applications() {
    let ctx = TestContext::new().await;
    seed_applications(&ctx);

    let views = ctx
        .services
        .approval_service
        .list_applications(&line_profile(MEMBER_USER_ID), ORG)
        .await
        .unwrap();
    let ids: Vec<&str> = views.iter().map(|v| v.application.id.as_str()).collect();
    assert_eq!(ids, vec!["app-1", "app-2"]);
    assert_eq!(views[0].event.id, "ev-1");
    assert_eq!(views[0].exhibitor.as_ref().map(|e| e.id.as_str()), Some("ex-1"));

    assert_matches!(
        ctx.services
            .approval_service
            .list_applications(&line_profile("Ustranger"), ORG)
            .await,
        Err(StallBoardError::PermissionDenied(_))
    );
}

#[tokio::test]
#[serial]
async fn test_managers_decide_and_get_the_refreshed_list() {
    let ctx = TestContext::new().await;
    seed_applications(&ctx);
    let approvals = &ctx.services.approval_service;

    let views = approvals
        .decide_application(&line_profile(OWNER_USER_ID), "app-1", Decision::Approve)
        .await
        .unwrap();
    let app1 = views.iter().find(|v| v.application.id == "app-1").unwrap();
    assert_eq!(app1.application.status, ApplicationStatus::Approved);
    assert!(app1.application.decided_at.is_some());

    let views = approvals
        .decide_application(&line_profile("Uadminrole"), "app-2", Decision::Reject)
        .await
        .unwrap();
    let app2 = views.iter().find(|v| v.application.id == "app-2").unwrap();
    assert_eq!(app2.application.status, ApplicationStatus::Rejected);

    // Last writer wins
    let views = approvals
        .decide_application(&line_profile(OWNER_USER_ID), "app-2", Decision::Approve)
        .await
        .unwrap();
    let app2 = views.iter().find(|v| v.application.id == "app-2").unwrap();
    assert_eq!(app2.application.status, ApplicationStatus::Approved);
}

#[tokio::test]
#[serial]
async fn test_members_and_strangers_cannot_decide() {
    let ctx = TestContext::new().await;
    seed_applications(&ctx);
    let approvals = &ctx.services.approval_service;

    assert_matches!(
        approvals
            .decide_application(&line_profile(MEMBER_USER_ID), "app-1", Decision::Approve)
            .await,
        Err(StallBoardError::PermissionDenied(_))
    );
    assert_matches!(
        approvals
            .decide_application(&line_profile(OWNER_USER_ID), "app-3", Decision::Approve)
            .await,
        Err(StallBoardError::OrganizerNotFound { .. })
    );
    assert_matches!(
        approvals
            .decide_application(&line_profile(OWNER_USER_ID), "app-missing", Decision::Approve)
            .await,
        Err(StallBoardError::ApplicationNotFound { .. })
    );
    assert_eq!(ctx.rows(tables::EVENT_APPLICATIONS)[0]["status"], "pending");
}
