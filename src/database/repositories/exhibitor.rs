//! Exhibitor repository

use crate::database::client::StoreClient;
use crate::database::query::{Filter, Query};
use crate::database::tables;
use crate::models::exhibitor::{Exhibitor, NewExhibitor};
use crate::utils::errors::StallBoardError;

#[derive(Clone, Debug)]
pub struct ExhibitorRepository {
    client: StoreClient,
}

impl ExhibitorRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, request: &NewExhibitor) -> Result<Exhibitor, StallBoardError> {
        Ok(self.client.insert(tables::EXHIBITORS, request).await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Exhibitor>, StallBoardError> {
        Ok(self
            .client
            .maybe_single(&Query::table(tables::EXHIBITORS).eq("id", id))
            .await?)
    }

    pub async fn find_by_line_user(&self, line_user_id: &str) -> Result<Option<Exhibitor>, StallBoardError> {
        Ok(self
            .client
            .maybe_single(&Query::table(tables::EXHIBITORS).eq("line_user_id", line_user_id))
            .await?)
    }

    /// Fetch several exhibitors in one request
    pub async fn find_many(&self, ids: &[String]) -> Result<Vec<Exhibitor>, StallBoardError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filters = ids
            .iter()
            .map(|id| Filter::Eq("id".to_string(), id.into()))
            .collect();
        Ok(self
            .client
            .all(&Query::table(tables::EXHIBITORS).or(filters))
            .await?)
    }
}
