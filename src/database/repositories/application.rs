//! Event application repository

use chrono::Utc;
use serde_json::json;

use crate::database::client::StoreClient;
use crate::database::query::{Filter, Query};
use crate::database::tables;
use crate::models::application::{ApplicationStatus, EventApplication, NewApplication};
use crate::utils::errors::{StallBoardError, StoreError};

#[derive(Clone, Debug)]
pub struct ApplicationRepository {
    client: StoreClient,
}

impl ApplicationRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Submit an application; a second one for the same pair is rejected
    pub async fn create(&self, request: &NewApplication) -> Result<EventApplication, StallBoardError> {
        self.client
            .insert(tables::EVENT_APPLICATIONS, request)
            .await
            .map_err(|e| match e {
                StoreError::Conflict { .. } => StallBoardError::DuplicateApplication,
                other => other.into(),
            })
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<EventApplication>, StallBoardError> {
        Ok(self
            .client
            .maybe_single(&Query::table(tables::EVENT_APPLICATIONS).eq("id", id))
            .await?)
    }

    pub async fn find_for_pair(
        &self,
        event_id: &str,
        exhibitor_id: &str,
    ) -> Result<Option<EventApplication>, StallBoardError> {
        Ok(self
            .client
            .maybe_single(
                &Query::table(tables::EVENT_APPLICATIONS)
                    .eq("event_id", event_id)
                    .eq("exhibitor_id", exhibitor_id),
            )
            .await?)
    }

    /// Applications to any of the given events, oldest first
    pub async fn list_for_events(&self, event_ids: &[String]) -> Result<Vec<EventApplication>, StallBoardError> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filters = event_ids
            .iter()
            .map(|id| Filter::Eq("event_id".to_string(), id.into()))
            .collect();
        Ok(self
            .client
            .all(
                &Query::table(tables::EVENT_APPLICATIONS)
                    .or(filters)
                    .order("applied_at", true),
            )
            .await?)
    }

    /// Applications submitted by one exhibitor, newest first
    pub async fn list_for_exhibitor(&self, exhibitor_id: &str) -> Result<Vec<EventApplication>, StallBoardError> {
        Ok(self
            .client
            .all(
                &Query::table(tables::EVENT_APPLICATIONS)
                    .eq("exhibitor_id", exhibitor_id)
                    .order("applied_at", false),
            )
            .await?)
    }

    /// Flip the status; last writer wins
    pub async fn set_status(&self, id: &str, status: ApplicationStatus) -> Result<EventApplication, StallBoardError> {
        let decided_at = match status {
            ApplicationStatus::Pending => None,
            _ => Some(Utc::now()),
        };
        self.client
            .update_one(
                &Query::table(tables::EVENT_APPLICATIONS).eq("id", id),
                json!({ "status": status, "decided_at": decided_at }),
            )
            .await
            .map_err(|e| match e {
                StoreError::NotSingle { count: 0, .. } => StallBoardError::ApplicationNotFound {
                    application_id: id.to_string(),
                },
                other => other.into(),
            })
    }
}
