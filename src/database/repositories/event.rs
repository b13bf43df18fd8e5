//! Event repository implementation

use chrono::NaiveDate;
use serde_json::Value;

use crate::database::client::StoreClient;
use crate::database::query::Query;
use crate::database::tables;
use crate::models::event::Event;
use crate::utils::errors::{StallBoardError, StoreError};

#[derive(Clone, Debug)]
pub struct EventRepository {
    client: StoreClient,
}

impl EventRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Create a new event from a prepared insert payload
    pub async fn create(&self, payload: &Value) -> Result<Event, StallBoardError> {
        Ok(self.client.insert(tables::EVENTS, payload).await?)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Event>, StallBoardError> {
        Ok(self
            .client
            .maybe_single(&Query::table(tables::EVENTS).eq("id", id))
            .await?)
    }

    /// Update event with a prepared patch
    pub async fn update(&self, id: &str, patch: Value) -> Result<Event, StallBoardError> {
        self.client
            .update_one(&Query::table(tables::EVENTS).eq("id", id), patch)
            .await
            .map_err(|e| match e {
                StoreError::NotSingle { count: 0, .. } => StallBoardError::EventNotFound {
                    event_id: id.to_string(),
                },
                other => other.into(),
            })
    }

    /// Delete event
    pub async fn delete(&self, id: &str) -> Result<usize, StallBoardError> {
        Ok(self.client.delete(&Query::table(tables::EVENTS).eq("id", id)).await?)
    }

    /// Events of one organizer ordered by start date
    pub async fn list_for_organizer(&self, organizer_id: &str) -> Result<Vec<Event>, StallBoardError> {
        Ok(self
            .client
            .all(
                &Query::table(tables::EVENTS)
                    .eq("organizer_id", organizer_id)
                    .order("start_date", true),
            )
            .await?)
    }

    /// Every event, newest start first
    pub async fn list_all(&self) -> Result<Vec<Event>, StallBoardError> {
        Ok(self
            .client
            .all(&Query::table(tables::EVENTS).order("start_date", false))
            .await?)
    }

    /// Published events that have not ended by `today`
    pub async fn list_upcoming(&self, today: NaiveDate) -> Result<Vec<Event>, StallBoardError> {
        Ok(self
            .client
            .all(
                &Query::table(tables::EVENTS)
                    .eq("is_published", true)
                    .gte("end_date", today)
                    .order("start_date", true),
            )
            .await?)
    }
}
