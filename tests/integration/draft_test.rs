//! Debounced draft autosave against the in-memory store

use std::time::Duration;

use serial_test::serial;

use StallBoard::database::{tables, StoreOp};
use StallBoard::forms::OrganizerForm;
use StallBoard::models::FormType;
use StallBoard::services::DraftAutosave;

use crate::helpers::*;

/// Let virtual time pass and give spawned saves a chance to finish
async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

fn autosave(ctx: &TestContext) -> DraftAutosave {
    ctx.services
        .registration_service
        .autosave(OWNER_USER_ID, FormType::OrganizerRegistration)
}

fn upserts(ctx: &TestContext) -> usize {
    ctx.count(StoreOp::Upsert, tables::FORM_DRAFTS)
}

fn deletes(ctx: &TestContext) -> usize {
    ctx.count(StoreOp::Delete, tables::FORM_DRAFTS)
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_rapid_edits_save_once_after_quiet_period() {
    let ctx = TestContext::new().await;
    let drafts = autosave(&ctx);
    assert!(drafts.hydrate::<OrganizerForm>().await.is_none());

    let mut form = OrganizerForm::default();
    for name in ["B", "Ba", "Bay", "Bay Market"] {
        form.organization_name = name.to_string();
        drafts.watch(&form);
        advance(300).await;
    }
    assert_eq!(upserts(&ctx), 0);
    assert!(drafts.has_pending());

    advance(600).await;
    assert_eq!(upserts(&ctx), 1);
    assert!(!drafts.has_pending());

    let rows = ctx.rows(tables::FORM_DRAFTS);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["form_type"], "organizer_registration");
    assert_eq!(rows[0]["payload"]["organization_name"], "Bay Market");
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_nothing_is_written_before_the_debounce_expires() {
    let ctx = TestContext::new().await;
    let drafts = autosave(&ctx);
    drafts.hydrate::<OrganizerForm>().await;

    drafts.watch(&organizer_form());
    advance(799).await;
    assert_eq!(upserts(&ctx), 0);

    advance(2).await;
    assert_eq!(upserts(&ctx), 1);
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_draft_survives_remount() {
    let ctx = TestContext::new().await;
    let form = organizer_form();

    let first = autosave(&ctx);
    first.hydrate::<OrganizerForm>().await;
    first.watch(&form);
    advance(800).await;
    drop(first);

    let second = autosave(&ctx);
    assert_eq!(second.hydrate::<OrganizerForm>().await, Some(form));
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_unchanged_form_is_not_saved_again() {
    let ctx = TestContext::new().await;
    let form = organizer_form();

    let drafts = autosave(&ctx);
    drafts.hydrate::<OrganizerForm>().await;
    drafts.watch(&form);
    advance(800).await;
    assert_eq!(upserts(&ctx), 1);

    drafts.watch(&form.clone());
    advance(1000).await;
    assert_eq!(upserts(&ctx), 1);

    // Hydrated content counts as saved too
    let remounted = autosave(&ctx);
    let restored: OrganizerForm = remounted.hydrate().await.unwrap();
    remounted.watch(&restored);
    advance(1000).await;
    assert_eq!(upserts(&ctx), 1);
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_clearing_every_field_deletes_the_draft() {
    let ctx = TestContext::new().await;
    let drafts = autosave(&ctx);
    drafts.hydrate::<OrganizerForm>().await;

    drafts.watch(&organizer_form());
    advance(800).await;
    assert_eq!(ctx.rows(tables::FORM_DRAFTS).len(), 1);

    drafts.watch(&OrganizerForm::default());
    advance(800).await;
    assert_eq!(upserts(&ctx), 1);
    assert_eq!(deletes(&ctx), 1);
    assert!(ctx.rows(tables::FORM_DRAFTS).is_empty());
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_blank_form_with_no_saved_draft_touches_nothing() {
    let ctx = TestContext::new().await;
    let drafts = autosave(&ctx);
    drafts.hydrate::<OrganizerForm>().await;

    drafts.watch(&OrganizerForm::default());
    advance(2000).await;
    assert_eq!(upserts(&ctx), 0);
    assert_eq!(deletes(&ctx), 0);
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_blank_edit_cancels_a_pending_save() {
    let ctx = TestContext::new().await;
    let drafts = autosave(&ctx);
    drafts.hydrate::<OrganizerForm>().await;

    drafts.watch(&organizer_form());
    advance(400).await;
    drafts.watch(&OrganizerForm::default());
    advance(2000).await;

    assert_eq!(upserts(&ctx), 0);
    assert!(ctx.rows(tables::FORM_DRAFTS).is_empty());
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_store_failures_are_swallowed() {
    let ctx = TestContext::new().await;
    let drafts = autosave(&ctx);
    drafts.hydrate::<OrganizerForm>().await;
    ctx.store.fail_on(StoreOp::Upsert, tables::FORM_DRAFTS);

    let form = organizer_form();
    drafts.watch(&form);
    advance(800).await;
    assert_eq!(upserts(&ctx), 1);
    assert!(ctx.rows(tables::FORM_DRAFTS).is_empty());

    // Nothing was recorded as saved, so the same content is retried
    ctx.store.clear_failures();
    drafts.watch(&form);
    advance(800).await;
    assert_eq!(upserts(&ctx), 2);
    assert_eq!(ctx.rows(tables::FORM_DRAFTS).len(), 1);
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_unreadable_draft_is_ignored() {
    let ctx = TestContext::new().await;
    ctx.seed(
        tables::FORM_DRAFTS,
        vec![serde_json::json!({
            "user_id": OWNER_USER_ID,
            "form_type": "organizer_registration",
            "payload": "not a form",
        })],
    );

    let drafts = autosave(&ctx);
    assert!(drafts.hydrate::<OrganizerForm>().await.is_none());
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_flush_and_clear() {
    let ctx = TestContext::new().await;
    let drafts = autosave(&ctx);
    drafts.hydrate::<OrganizerForm>().await;

    drafts.watch(&organizer_form());
    drafts.flush().await;
    assert_eq!(upserts(&ctx), 1);
    assert!(!drafts.has_pending());

    drafts.clear().await;
    assert!(ctx.rows(tables::FORM_DRAFTS).is_empty());

    advance(2000).await;
    assert_eq!(upserts(&ctx), 1);
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_drafts_are_scoped_per_form_and_user() {
    let ctx = TestContext::new().await;
    let organizer = autosave(&ctx);
    let other_user = ctx
        .services
        .registration_service
        .autosave(MEMBER_USER_ID, FormType::OrganizerRegistration);
    let store = ctx
        .services
        .registration_service
        .autosave(OWNER_USER_ID, FormType::ExhibitorRegistration);

    organizer.hydrate::<OrganizerForm>().await;
    organizer.watch(&organizer_form());
    advance(800).await;

    assert!(other_user.hydrate::<OrganizerForm>().await.is_none());
    assert!(store.hydrate::<OrganizerForm>().await.is_none());
    assert!(organizer.hydrate::<OrganizerForm>().await.is_some());
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_disabled_autosave_never_touches_the_store() {
    let ctx = TestContext::new_with_config(TestConfig {
        drafts_enabled: false,
        ..Default::default()
    })
    .await;
    let drafts = autosave(&ctx);

    assert!(drafts.hydrate::<OrganizerForm>().await.is_none());
    drafts.watch(&organizer_form());
    advance(2000).await;
    assert!(ctx.store.operations().is_empty());
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_flush_and_clear_wait_for_a_save_in_flight() {
    let ctx = TestContext::new().await;
    ctx.slow_down(StoreOp::Upsert, tables::FORM_DRAFTS, 100);
    let drafts = autosave(&ctx);
    drafts.hydrate::<OrganizerForm>().await;

    drafts.watch(&organizer_form());
    advance(850).await;
    assert!(!drafts.has_pending());
    assert!(ctx.rows(tables::FORM_DRAFTS).is_empty());

    drafts.flush().await;
    assert_eq!(ctx.rows(tables::FORM_DRAFTS).len(), 1);

    drafts.clear().await;
    advance(500).await;
    assert!(ctx.rows(tables::FORM_DRAFTS).is_empty());
    assert!(autosave(&ctx).hydrate::<OrganizerForm>().await.is_none());
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_cleared_draft_is_not_written_back_by_a_late_save() {
    let ctx = TestContext::new().await;
    ctx.slow_down(StoreOp::Upsert, tables::FORM_DRAFTS, 100);
    let drafts = autosave(&ctx);
    drafts.hydrate::<OrganizerForm>().await;

    let form = organizer_form();
    drafts.watch(&form);
    advance(850).await;

    drafts.clear().await;
    advance(500).await;
    assert!(ctx.rows(tables::FORM_DRAFTS).is_empty());
    assert_eq!(upserts(&ctx), 1);

    // The same content counts as unsaved again after a clear
    drafts.watch(&form);
    assert!(drafts.has_pending());
}
