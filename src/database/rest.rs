//! REST data store
//!
//! Talks to the hosted store's PostgREST endpoint (`/rest/v1/<table>`).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::query::Query;
use super::store::DataStore;
use crate::config::SupabaseConfig;
use crate::utils::errors::{ApiErrorBody, StallBoardError, StoreError, StoreResult, Result};
use crate::utils::logging::log_store_operation;

/// Store client for the hosted PostgREST API
#[derive(Clone, Debug)]
pub struct RestStore {
    client: Client,
    rest_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl RestStore {
    /// Create a new REST store from configuration
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("StallBoard/1.0")
            .build()
            .map_err(StallBoardError::Http)?;

        let mut base = Url::parse(&config.url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base.join("rest/v1/")?;

        Ok(Self {
            client,
            rest_url,
            anon_key: config.anon_key.clone(),
            access_token: None,
        })
    }

    /// Send requests with a signed-in user's token instead of the anon key
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn table_url(&self, table: &str) -> StoreResult<Url> {
        self.rest_url
            .join(table)
            .map_err(|e| StoreError::RequestFailed(format!("bad table name {}: {}", table, e)))
    }

    fn request(&self, method: Method, table: &str) -> StoreResult<RequestBuilder> {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        Ok(self
            .client
            .request(method, self.table_url(table)?)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer))
    }

    async fn send(&self, operation: &str, table: &str, request: RequestBuilder) -> StoreResult<Value> {
        let started = Instant::now();
        let result = self.execute(table, request).await;
        log_store_operation(operation, table, started.elapsed().as_millis() as u64, result.is_ok());
        result
    }

    async fn execute(&self, table: &str, request: RequestBuilder) -> StoreResult<Value> {
        let response = request.send().await.map_err(map_transport_error)?;
        let response = check_status(table, response).await?;

        let text = response
            .text()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        serde_json::from_str(&text).map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}

fn map_transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::RequestFailed(e.to_string())
    }
}

async fn check_status(table: &str, response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let raw = response.text().await.unwrap_or_default();
    let body = ApiErrorBody::parse(status.as_u16(), &raw);
    if body.is_unique_violation() {
        return Err(StoreError::Conflict {
            table: table.to_string(),
        });
    }
    Err(StoreError::Api(body))
}

/// Representation responses are arrays; take the first row
fn first_row(table: &str, value: Value) -> StoreResult<Value> {
    match value {
        Value::Array(mut rows) if !rows.is_empty() => Ok(rows.swap_remove(0)),
        Value::Array(_) => Err(StoreError::NotSingle {
            table: table.to_string(),
            count: 0,
        }),
        row @ Value::Object(_) => Ok(row),
        other => Err(StoreError::InvalidResponse(format!("unexpected body: {}", other))),
    }
}

fn rows(value: Value) -> StoreResult<Vec<Value>> {
    match value {
        Value::Array(rows) => Ok(rows),
        other => Err(StoreError::InvalidResponse(format!("expected array, got {}", other))),
    }
}

#[async_trait]
impl DataStore for RestStore {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Value>> {
        debug!(table = %query.table, filters = query.filters.len(), "Selecting rows");
        let request = self
            .request(Method::GET, &query.table)?
            .query(&query.select_params());
        rows(self.send("select", &query.table, request).await?)
    }

    async fn insert(&self, table: &str, payload: Value) -> StoreResult<Value> {
        let request = self
            .request(Method::POST, table)?
            .header("Prefer", "return=representation")
            .json(&payload);
        first_row(table, self.send("insert", table, request).await?)
    }

    async fn upsert(&self, table: &str, payload: Value, on_conflict: &[&str]) -> StoreResult<Value> {
        let request = self
            .request(Method::POST, table)?
            .query(&[("on_conflict", on_conflict.join(","))])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&payload);
        first_row(table, self.send("upsert", table, request).await?)
    }

    async fn update(&self, query: &Query, payload: Value) -> StoreResult<Vec<Value>> {
        let request = self
            .request(Method::PATCH, &query.table)?
            .query(&query.filter_params())
            .header("Prefer", "return=representation")
            .json(&payload);
        rows(self.send("update", &query.table, request).await?)
    }

    async fn delete(&self, query: &Query) -> StoreResult<usize> {
        let request = self
            .request(Method::DELETE, &query.table)?
            .query(&query.filter_params())
            .header("Prefer", "return=representation");
        Ok(rows(self.send("delete", &query.table, request).await?)?.len())
    }
}
