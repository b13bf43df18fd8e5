//! LINE mocks
//!
//! A wiremock server for the LINE profile API and an in-process login
//! provider that maps access tokens to fixed profiles.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use StallBoard::config::LineConfig;
use StallBoard::services::{LineProfile, LoginProvider, Session};
use StallBoard::{Result, StallBoardError};

pub const TEST_CHANNEL_ID: &str = "1650000000";
pub const TEST_CHANNEL_SECRET: &str = "test-channel-secret";

/// Mock LINE API server for testing
pub struct LineMockServer {
    pub server: MockServer,
    pub base_url: String,
}

impl LineMockServer {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// LINE settings pointing at this server
    pub fn config(&self) -> LineConfig {
        LineConfig {
            channel_id: TEST_CHANNEL_ID.to_string(),
            channel_secret: Some(TEST_CHANNEL_SECRET.to_string()),
            liff_id: format!("{}-test", TEST_CHANNEL_ID),
            api_url: self.base_url.clone(),
        }
    }

    /// Answer `/v2/profile` for one access token
    pub async fn mock_profile(&self, access_token: &str, profile: &LineProfile) {
        let mut body = json!({
            "userId": profile.user_id,
            "displayName": profile.display_name,
        });
        if let Some(picture) = &profile.picture_url {
            body["pictureUrl"] = json!(picture);
        }

        Mock::given(method("GET"))
            .and(path("/v2/profile"))
            .and(header("authorization", format!("Bearer {}", access_token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Reject every other token the way LINE does
    pub async fn mock_invalid_token(&self) {
        Mock::given(method("GET"))
            .and(path("/v2/profile"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "The access token expired"
            })))
            .mount(&self.server)
            .await;
    }
}

/// Login provider answering from a fixed token table
#[derive(Default)]
pub struct StaticLoginProvider {
    profiles: Mutex<HashMap<String, LineProfile>>,
    session: Mutex<Session>,
}

impl StaticLoginProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `access_token` as `profile`
    pub fn register(&self, access_token: &str, profile: LineProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(access_token.to_string(), profile);
    }
}

#[async_trait]
impl LoginProvider for StaticLoginProvider {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn is_logged_in(&self) -> bool {
        self.session.lock().unwrap().is_authenticated()
    }

    async fn login(&self, access_token: &str) -> Result<Session> {
        let profile = self
            .profiles
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| StallBoardError::Authentication("unknown access token".to_string()))?;
        let session = Session::Authenticated(profile);
        *self.session.lock().unwrap() = session.clone();
        Ok(session)
    }

    async fn profile(&self) -> Result<LineProfile> {
        self.session.lock().unwrap().require().cloned()
    }

    async fn logout(&self) {
        *self.session.lock().unwrap() = Session::Anonymous;
    }
}
