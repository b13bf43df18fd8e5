//! Typed access on top of a [`DataStore`]

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::query::Query;
use super::store::DataStore;
use crate::utils::errors::{StoreError, StoreResult};

/// Cloneable handle that converts rows to and from model types
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn DataStore>,
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient").finish_non_exhaustive()
    }
}

fn decode<T: DeserializeOwned>(row: Value) -> StoreResult<T> {
    serde_json::from_value(row).map_err(|e| StoreError::InvalidResponse(e.to_string()))
}

fn encode<P: Serialize>(payload: &P) -> StoreResult<Value> {
    serde_json::to_value(payload).map_err(|e| StoreError::InvalidResponse(e.to_string()))
}

impl StoreClient {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// All matching rows
    pub async fn all<T: DeserializeOwned>(&self, query: &Query) -> StoreResult<Vec<T>> {
        self.store
            .select(query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Zero or one row; more than one is an error
    pub async fn maybe_single<T: DeserializeOwned>(&self, query: &Query) -> StoreResult<Option<T>> {
        let mut rows = self.store.select(&query.clone().limit(2)).await?;
        match rows.len() {
            0 => Ok(None),
            1 => decode(rows.swap_remove(0)).map(Some),
            count => Err(StoreError::NotSingle {
                table: query.table.clone(),
                count,
            }),
        }
    }

    /// Exactly one row
    pub async fn single<T: DeserializeOwned>(&self, query: &Query) -> StoreResult<T> {
        self.maybe_single(query).await?.ok_or_else(|| StoreError::NotSingle {
            table: query.table.clone(),
            count: 0,
        })
    }

    pub async fn insert<P: Serialize, T: DeserializeOwned>(&self, table: &str, payload: &P) -> StoreResult<T> {
        decode(self.store.insert(table, encode(payload)?).await?)
    }

    pub async fn upsert<P: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        payload: &P,
        on_conflict: &[&str],
    ) -> StoreResult<T> {
        decode(self.store.upsert(table, encode(payload)?, on_conflict).await?)
    }

    /// Patch matching rows and return them
    pub async fn update<T: DeserializeOwned>(&self, query: &Query, patch: Value) -> StoreResult<Vec<T>> {
        self.store
            .update(query, patch)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Patch exactly one row
    pub async fn update_one<T: DeserializeOwned>(&self, query: &Query, patch: Value) -> StoreResult<T> {
        let mut rows = self.store.update(query, patch).await?;
        match rows.len() {
            1 => decode(rows.swap_remove(0)),
            count => Err(StoreError::NotSingle {
                table: query.table.clone(),
                count,
            }),
        }
    }

    pub async fn delete(&self, query: &Query) -> StoreResult<usize> {
        self.store.delete(query).await
    }
}
