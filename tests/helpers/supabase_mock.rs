//! Mock server for the hosted store
//!
//! Serves `/rest/v1/<table>` and `/storage/v1/object/<bucket>/...` the way
//! the hosted backend answers, so the REST store and the storage service
//! can be exercised without a network.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path, path_regex},
    Mock, MockServer, ResponseTemplate,
};

use StallBoard::config::SupabaseConfig;

pub const TEST_ANON_KEY: &str = "test-anon-key";

/// Mock hosted store for testing
pub struct SupabaseMockServer {
    pub server: MockServer,
    pub base_url: String,
}

impl SupabaseMockServer {
    /// Create a new mock store
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Connection settings pointing at this server
    pub fn config(&self) -> SupabaseConfig {
        SupabaseConfig {
            url: self.base_url.clone(),
            anon_key: TEST_ANON_KEY.to_string(),
            timeout_seconds: 5,
        }
    }

    fn table_path(table: &str) -> String {
        format!("/rest/v1/{}", table)
    }

    /// Answer selects on `table` with `rows`
    pub async fn mock_select(&self, table: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path(Self::table_path(table)))
            .and(header("apikey", TEST_ANON_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    /// Answer inserts on `table` with the given representation
    pub async fn mock_insert(&self, table: &str, row: Value) {
        Mock::given(method("POST"))
            .and(path(Self::table_path(table)))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row])))
            .mount(&self.server)
            .await;
    }

    /// Answer updates on `table` with the given rows
    pub async fn mock_update(&self, table: &str, rows: Value) {
        Mock::given(method("PATCH"))
            .and(path(Self::table_path(table)))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    /// Fail every request on `table` with a status and a raw body
    pub async fn mock_error(&self, table: &str, status: u16, body: &str) {
        Mock::given(path(Self::table_path(table)))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Accept uploads into `bucket`, echoing the stored key
    pub async fn mock_upload(&self, bucket: &str) {
        Mock::given(method("POST"))
            .and(path_regex(format!(r"^/storage/v1/object/{}/.+$", bucket)))
            .and(header("x-upsert", "false"))
            .respond_with(move |request: &wiremock::Request| {
                let key = request
                    .url
                    .path()
                    .trim_start_matches("/storage/v1/object/")
                    .to_string();
                ResponseTemplate::new(200).set_body_json(json!({ "Key": key }))
            })
            .mount(&self.server)
            .await;
    }

    /// Reject uploads into `bucket`
    pub async fn mock_upload_error(&self, bucket: &str, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path_regex(format!(r"^/storage/v1/object/{}/.+$", bucket)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Requests received so far
    pub async fn received(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Reset all mocks
    pub async fn reset(&self) {
        self.server.reset().await;
    }
}
