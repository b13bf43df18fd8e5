//! Form draft repository

use chrono::Utc;

use crate::database::client::StoreClient;
use crate::database::query::Query;
use crate::database::tables;
use crate::models::draft::{DraftUpsert, FormDraft, FormType};
use crate::utils::errors::StoreResult;

/// Unique key of the drafts table
pub const DRAFT_CONFLICT_KEYS: [&str; 2] = ["user_id", "form_type"];

#[derive(Clone, Debug)]
pub struct DraftRepository {
    client: StoreClient,
}

impl DraftRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    fn key_query(user_id: &str, form_type: &FormType) -> Query {
        Query::table(tables::FORM_DRAFTS)
            .eq("user_id", user_id)
            .eq("form_type", form_type.to_string())
    }

    /// The saved draft, if any
    pub async fn fetch(&self, user_id: &str, form_type: &FormType) -> StoreResult<Option<FormDraft>> {
        self.client.maybe_single(&Self::key_query(user_id, form_type)).await
    }

    /// Insert or replace the draft payload
    pub async fn save(
        &self,
        user_id: &str,
        form_type: &FormType,
        payload: &serde_json::Value,
    ) -> StoreResult<FormDraft> {
        let row = DraftUpsert {
            user_id,
            form_type: form_type.to_string(),
            payload,
            updated_at: Utc::now(),
        };
        self.client
            .upsert(tables::FORM_DRAFTS, &row, &DRAFT_CONFLICT_KEYS)
            .await
    }

    /// Remove the draft; missing rows are fine
    pub async fn delete(&self, user_id: &str, form_type: &FormType) -> StoreResult<usize> {
        self.client.delete(&Self::key_query(user_id, form_type)).await
    }
}
