//! Organizer invitation repository

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::database::client::StoreClient;
use crate::database::query::Query;
use crate::database::tables;
use crate::models::invitation::{InvitationStatus, NewInvitation, OrganizerInvitation};
use crate::utils::errors::{StallBoardError, StoreResult};

#[derive(Clone, Debug)]
pub struct InvitationRepository {
    client: StoreClient,
}

impl InvitationRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Store a freshly generated invitation
    pub async fn create(&self, request: &NewInvitation) -> StoreResult<OrganizerInvitation> {
        self.client.insert(tables::ORGANIZER_INVITATIONS, request).await
    }

    /// Look up an invitation by its code
    pub async fn find_by_code(&self, code: &str) -> Result<Option<OrganizerInvitation>, StallBoardError> {
        Ok(self
            .client
            .maybe_single(&Query::table(tables::ORGANIZER_INVITATIONS).eq("code", code))
            .await?)
    }

    /// Invitations issued by an organizer, newest first
    pub async fn list_for_organizer(&self, organizer_id: &str) -> Result<Vec<OrganizerInvitation>, StallBoardError> {
        Ok(self
            .client
            .all(
                &Query::table(tables::ORGANIZER_INVITATIONS)
                    .eq("organizer_id", organizer_id)
                    .order("created_at", false),
            )
            .await?)
    }

    /// Mark an invitation as used by `line_user_id`
    ///
    /// Only matches while the row is still active and unused, so a racing
    /// second redemption updates nothing.
    pub async fn mark_used(
        &self,
        invitation_id: &str,
        line_user_id: &str,
        used_at: DateTime<Utc>,
    ) -> StoreResult<OrganizerInvitation> {
        self.client
            .update_one(
                &Query::table(tables::ORGANIZER_INVITATIONS)
                    .eq("id", invitation_id)
                    .eq("status", InvitationStatus::Active.as_str())
                    .is_null("used_at"),
                json!({
                    "status": InvitationStatus::Used,
                    "used_at": used_at,
                    "used_by": line_user_id,
                }),
            )
            .await
    }

    /// Revoke an organizer's invitation while it is still active
    pub async fn revoke(
        &self,
        organizer_id: &str,
        invitation_id: &str,
    ) -> Result<Vec<OrganizerInvitation>, StallBoardError> {
        Ok(self
            .client
            .update(
                &Query::table(tables::ORGANIZER_INVITATIONS)
                    .eq("id", invitation_id)
                    .eq("organizer_id", organizer_id)
                    .eq("status", InvitationStatus::Active.as_str()),
                json!({ "status": InvitationStatus::Revoked }),
            )
            .await?)
    }
}
