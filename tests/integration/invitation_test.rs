//! Invitation code issue, revoke and redemption

use assert_matches::assert_matches;
use serial_test::serial;

use StallBoard::database::{tables, StoreOp};
use StallBoard::models::{InvitationStatus, MemberRole};
use StallBoard::StallBoardError;

use crate::helpers::*;

const ORG: &str = "org-1";

async fn context_with_organizer() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.seed(tables::ORGANIZERS, vec![organizer_row(ORG, OWNER_USER_ID, true)]);
    ctx
}

#[tokio::test]
#[serial]
async fn test_owner_issues_and_member_redeems_once() {
    let ctx = context_with_organizer().await;
    let owner = line_profile(OWNER_USER_ID);
    let member = line_profile(MEMBER_USER_ID);
    let invitations = &ctx.services.invitation_service;

    let invitation = invitations.create(&owner, ORG, MemberRole::Member).await.unwrap();
    assert_eq!(invitation.code.len(), ctx.settings.invitations.code_length);
    assert_eq!(invitation.status, InvitationStatus::Active);

    let joined = invitations.redeem(&member, &invitation.code).await.unwrap();
    assert_eq!(joined.organizer_id, ORG);
    assert_eq!(joined.role, MemberRole::Member);
    assert_eq!(joined.invitation_id.as_deref(), Some(invitation.id.as_str()));

    let rows = ctx.rows(tables::ORGANIZER_INVITATIONS);
    assert_eq!(rows[0]["status"], "used");
    assert_eq!(rows[0]["used_by"], MEMBER_USER_ID);

    let other = line_profile("Uother");
    assert_matches!(
        invitations.redeem(&other, &invitation.code).await,
        Err(StallBoardError::InvitationAlreadyUsed)
    );
    assert_eq!(ctx.rows(tables::ORGANIZER_MEMBERS).len(), 1);
}

#[tokio::test]
#[serial]
async fn test_sequential_redemptions_admit_one_member() {
    let ctx = context_with_organizer().await;
    ctx.seed(
        tables::ORGANIZER_INVITATIONS,
        vec![invitation_row("inv-1", ORG, "RACE2345", "member", 7)],
    );
    let invitations = &ctx.services.invitation_service;

    invitations.redeem(&line_profile("Ufirst"), "RACE2345").await.unwrap();
    assert_matches!(
        invitations.redeem(&line_profile("Usecond"), "RACE2345").await,
        Err(StallBoardError::InvitationAlreadyUsed)
    );
    assert_eq!(ctx.rows(tables::ORGANIZER_MEMBERS).len(), 1);
}

#[tokio::test]
#[serial]
async fn test_interleaved_redemptions_mark_the_code_once() {
    let ctx = context_with_organizer().await;
    ctx.seed(
        tables::ORGANIZER_INVITATIONS,
        vec![invitation_row("inv-1", ORG, "RACE2345", "member", 7)],
    );
    // Both callers pass the checks before either membership is written
    ctx.slow_down(StoreOp::Insert, tables::ORGANIZER_MEMBERS, 50);
    let first = line_profile("Ufirst");
    let second = line_profile("Usecond");
    let invitations = &ctx.services.invitation_service;

    let (a, b) = tokio::join!(
        invitations.redeem(&first, "RACE2345"),
        invitations.redeem(&second, "RACE2345")
    );

    let (joined, failed) = match (a, b) {
        (Ok(member), Err(err)) | (Err(err), Ok(member)) => (member, err),
        other => panic!("expected one redemption to succeed, got {:?}", other),
    };
    assert_matches!(
        failed,
        StallBoardError::InvitationMarkFailed { ref invitation_id, .. } if invitation_id == "inv-1"
    );

    let invitation = &ctx.rows(tables::ORGANIZER_INVITATIONS)[0];
    assert_eq!(invitation["status"], "used");
    assert_eq!(invitation["used_by"], joined.line_user_id.as_str());

    // The losing membership is kept; nothing rolls it back
    let members = ctx.rows(tables::ORGANIZER_MEMBERS);
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|row| row["invitation_id"] == "inv-1"));
}

#[tokio::test]
#[serial]
async fn test_code_is_normalized_before_lookup() {
    let ctx = context_with_organizer().await;
    ctx.seed(
        tables::ORGANIZER_INVITATIONS,
        vec![invitation_row("inv-1", ORG, "ABCD2345", "admin", 7)],
    );

    let member = line_profile(MEMBER_USER_ID);
    let joined = ctx
        .services
        .invitation_service
        .redeem(&member, "  ａｂｃｄ２３４５ ")
        .await
        .unwrap();
    assert_eq!(joined.role, MemberRole::Admin);
}

#[tokio::test]
#[serial]
async fn test_unknown_blank_and_expired_codes() {
    let ctx = context_with_organizer().await;
    ctx.seed(
        tables::ORGANIZER_INVITATIONS,
        vec![invitation_row("inv-old", ORG, "OLDC2345", "member", -1)],
    );
    let member = line_profile(MEMBER_USER_ID);
    let invitations = &ctx.services.invitation_service;

    assert_matches!(
        invitations.redeem(&member, "   ").await,
        Err(StallBoardError::Validation { ref field, .. }) if field == "code"
    );
    assert_matches!(
        invitations.redeem(&member, "NOPE2345").await,
        Err(StallBoardError::InvitationNotFound)
    );
    assert_matches!(
        invitations.redeem(&member, "OLDC2345").await,
        Err(StallBoardError::InvitationExpired)
    );
    assert!(ctx.rows(tables::ORGANIZER_MEMBERS).is_empty());
}

#[tokio::test]
#[serial]
async fn test_owner_and_existing_members_cannot_redeem() {
    let ctx = context_with_organizer().await;
    ctx.seed(tables::ORGANIZER_MEMBERS, vec![member_row(ORG, MEMBER_USER_ID, "member")]);
    ctx.seed(
        tables::ORGANIZER_INVITATIONS,
        vec![invitation_row("inv-1", ORG, "JOIN2345", "member", 7)],
    );
    let invitations = &ctx.services.invitation_service;

    assert_matches!(
        invitations.redeem(&line_profile(OWNER_USER_ID), "JOIN2345").await,
        Err(StallBoardError::AlreadyMember)
    );
    assert_matches!(
        invitations.redeem(&line_profile(MEMBER_USER_ID), "JOIN2345").await,
        Err(StallBoardError::AlreadyMember)
    );
    assert_eq!(ctx.rows(tables::ORGANIZER_INVITATIONS)[0]["status"], "active");
}

#[tokio::test]
#[serial]
async fn test_failed_mark_keeps_membership_and_reports() {
    let ctx = context_with_organizer().await;
    ctx.seed(
        tables::ORGANIZER_INVITATIONS,
        vec![invitation_row("inv-1", ORG, "MARK2345", "member", 7)],
    );
    ctx.store.fail_on(StoreOp::Update, tables::ORGANIZER_INVITATIONS);
    let member = line_profile(MEMBER_USER_ID);

    let err = ctx
        .services
        .invitation_service
        .redeem(&member, "MARK2345")
        .await
        .unwrap_err();
    assert_matches!(
        err,
        StallBoardError::InvitationMarkFailed { ref invitation_id, .. } if invitation_id == "inv-1"
    );
    assert_eq!(ctx.rows(tables::ORGANIZER_MEMBERS).len(), 1);
    assert_eq!(ctx.rows(tables::ORGANIZER_INVITATIONS)[0]["status"], "active");

    // The stored membership blocks a retry with the same code
    ctx.store.clear_failures();
    assert_matches!(
        ctx.services.invitation_service.redeem(&member, "MARK2345").await,
        Err(StallBoardError::AlreadyMember)
    );
}

#[tokio::test]
#[serial]
async fn test_only_managers_issue_codes() {
    let ctx = context_with_organizer().await;
    ctx.seed(
        tables::ORGANIZER_MEMBERS,
        vec![
            member_row(ORG, "Uadminrole", "admin"),
            member_row(ORG, MEMBER_USER_ID, "member"),
        ],
    );
    let invitations = &ctx.services.invitation_service;

    assert!(invitations
        .create(&line_profile("Uadminrole"), ORG, MemberRole::Member)
        .await
        .is_ok());
    assert_matches!(
        invitations.create(&line_profile(MEMBER_USER_ID), ORG, MemberRole::Member).await,
        Err(StallBoardError::PermissionDenied(_))
    );
    assert_matches!(
        invitations.create(&line_profile("Ustranger"), ORG, MemberRole::Member).await,
        Err(StallBoardError::PermissionDenied(_))
    );
    assert_matches!(
        invitations.create(&line_profile(OWNER_USER_ID), ORG, MemberRole::Owner).await,
        Err(StallBoardError::InvalidInput(_))
    );
}

#[tokio::test]
#[serial]
async fn test_revoked_code_reads_as_used() {
    let ctx = context_with_organizer().await;
    let owner = line_profile(OWNER_USER_ID);
    let invitations = &ctx.services.invitation_service;

    let invitation = invitations.create(&owner, ORG, MemberRole::Member).await.unwrap();
    let listed = invitations.revoke(&owner, ORG, &invitation.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, InvitationStatus::Revoked);

    assert_matches!(
        invitations.revoke(&owner, ORG, &invitation.id).await,
        Err(StallBoardError::InvalidInput(_))
    );
    assert_matches!(
        invitations.redeem(&line_profile(MEMBER_USER_ID), &invitation.code).await,
        Err(StallBoardError::InvitationAlreadyUsed)
    );
}
