//! Organizer and membership repository

use serde_json::json;
use chrono::Utc;

use crate::database::client::StoreClient;
use crate::database::query::Query;
use crate::database::tables;
use crate::models::organizer::{NewOrganizer, NewOrganizerMember, Organizer, OrganizerMember};
use crate::utils::errors::StallBoardError;

#[derive(Clone, Debug)]
pub struct OrganizerRepository {
    client: StoreClient,
}

impl OrganizerRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Create a new organizer
    pub async fn create(&self, request: &NewOrganizer) -> Result<Organizer, StallBoardError> {
        Ok(self.client.insert(tables::ORGANIZERS, request).await?)
    }

    /// Find organizer by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Organizer>, StallBoardError> {
        Ok(self
            .client
            .maybe_single(&Query::table(tables::ORGANIZERS).eq("id", id))
            .await?)
    }

    /// Find the organizer a LINE user registered
    pub async fn find_by_line_user(&self, line_user_id: &str) -> Result<Option<Organizer>, StallBoardError> {
        Ok(self
            .client
            .maybe_single(&Query::table(tables::ORGANIZERS).eq("line_user_id", line_user_id))
            .await?)
    }

    /// List organizers, pending approval first, newest first within each group
    pub async fn list(&self) -> Result<Vec<Organizer>, StallBoardError> {
        Ok(self
            .client
            .all(
                &Query::table(tables::ORGANIZERS)
                    .order("is_approved", true)
                    .order("created_at", false),
            )
            .await?)
    }

    /// List organizers waiting for approval
    pub async fn list_pending(&self) -> Result<Vec<Organizer>, StallBoardError> {
        Ok(self
            .client
            .all(
                &Query::table(tables::ORGANIZERS)
                    .eq("is_approved", false)
                    .order("created_at", true),
            )
            .await?)
    }

    /// Flip the approval flag
    pub async fn set_approved(&self, id: &str, approved: bool) -> Result<Organizer, StallBoardError> {
        self.client
            .update_one(
                &Query::table(tables::ORGANIZERS).eq("id", id),
                json!({ "is_approved": approved, "updated_at": Utc::now() }),
            )
            .await
            .map_err(|e| match e {
                crate::utils::errors::StoreError::NotSingle { count: 0, .. } => {
                    StallBoardError::OrganizerNotFound { organizer_id: id.to_string() }
                }
                other => other.into(),
            })
    }

    /// Add a member row
    pub async fn add_member(&self, request: &NewOrganizerMember) -> Result<OrganizerMember, StallBoardError> {
        Ok(self.client.insert(tables::ORGANIZER_MEMBERS, request).await?)
    }

    /// Memberships held by a LINE user
    pub async fn memberships_of(&self, line_user_id: &str) -> Result<Vec<OrganizerMember>, StallBoardError> {
        Ok(self
            .client
            .all(
                &Query::table(tables::ORGANIZER_MEMBERS)
                    .eq("line_user_id", line_user_id)
                    .order("joined_at", true),
            )
            .await?)
    }

    /// A user's membership in one organizer
    pub async fn find_membership(
        &self,
        organizer_id: &str,
        line_user_id: &str,
    ) -> Result<Option<OrganizerMember>, StallBoardError> {
        Ok(self
            .client
            .maybe_single(
                &Query::table(tables::ORGANIZER_MEMBERS)
                    .eq("organizer_id", organizer_id)
                    .eq("line_user_id", line_user_id),
            )
            .await?)
    }

    /// All members of an organizer
    pub async fn members(&self, organizer_id: &str) -> Result<Vec<OrganizerMember>, StallBoardError> {
        Ok(self
            .client
            .all(
                &Query::table(tables::ORGANIZER_MEMBERS)
                    .eq("organizer_id", organizer_id)
                    .order("joined_at", true),
            )
            .await?)
    }
}
