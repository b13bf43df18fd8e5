//! Data store abstraction
//!
//! The hosted store is reached through this trait so the consoles can be
//! driven against the REST backend or an in-process store.

use async_trait::async_trait;
use serde_json::Value;

use super::query::Query;
use crate::utils::errors::StoreResult;

/// Row-level operations offered by the hosted relational store
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Rows matching the query, ordered and limited as requested
    async fn select(&self, query: &Query) -> StoreResult<Vec<Value>>;

    /// Insert one row and return it as stored
    async fn insert(&self, table: &str, payload: Value) -> StoreResult<Value>;

    /// Insert or merge on the given unique columns, returning the stored row
    async fn upsert(&self, table: &str, payload: Value, on_conflict: &[&str]) -> StoreResult<Value>;

    /// Patch every row matching the query's filters, returning the new rows
    async fn update(&self, query: &Query, payload: Value) -> StoreResult<Vec<Value>>;

    /// Delete every row matching the query's filters, returning the count
    async fn delete(&self, query: &Query) -> StoreResult<usize>;
}
