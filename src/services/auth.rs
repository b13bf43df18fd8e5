//! Authentication service implementation
//!
//! Sessions come from LINE Login: an access token is verified against the
//! LINE profile endpoint, or a LIFF ID token is verified locally with the
//! channel secret. Admin access is granted by the configured user list.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::settings::{LineConfig, Settings};
use crate::utils::errors::{Result, StallBoardError};
use crate::utils::logging::{log_admin_action, log_api_error};

const LINE_ISSUER: &str = "https://access.line.me";

/// Profile returned by the login provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "pictureUrl", default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

/// Who is using a console
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(LineProfile),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Session::Authenticated(profile) => Some(&profile.user_id),
            Session::Anonymous => None,
        }
    }

    /// The signed-in profile, or `NotAuthenticated`
    pub fn require(&self) -> Result<&LineProfile> {
        match self {
            Session::Authenticated(profile) => Ok(profile),
            Session::Anonymous => Err(StallBoardError::NotAuthenticated),
        }
    }
}

/// Claims of a LIFF ID token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Third-party login contract
#[async_trait]
pub trait LoginProvider: Send + Sync {
    /// Prepare the provider; fails when it is not configured
    async fn init(&self) -> Result<()>;

    async fn is_logged_in(&self) -> bool;

    /// Sign in with an access token issued by the provider
    async fn login(&self, access_token: &str) -> Result<Session>;

    /// Profile of the signed-in user
    async fn profile(&self) -> Result<LineProfile>;

    async fn logout(&self);
}

/// LINE Login client
#[derive(Clone, Debug)]
pub struct LineLoginClient {
    client: Client,
    config: LineConfig,
    session: Arc<RwLock<Session>>,
}

impl LineLoginClient {
    pub fn new(config: LineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("StallBoard/1.0")
            .build()
            .map_err(StallBoardError::Http)?;

        Ok(Self {
            client,
            config,
            session: Arc::new(RwLock::new(Session::Anonymous)),
        })
    }

    /// Current session
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Verify a LIFF ID token signed with the channel secret
    pub fn verify_id_token(&self, id_token: &str) -> Result<IdTokenClaims> {
        let secret = self
            .config
            .channel_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StallBoardError::Config("line.channel_secret is required to verify ID tokens".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.channel_id.as_str()]);
        validation.set_issuer(&[LINE_ISSUER]);

        let data = decode::<IdTokenClaims>(id_token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
        Ok(data.claims)
    }

    /// Sign in from a verified ID token without calling the profile API
    pub async fn login_with_id_token(&self, id_token: &str) -> Result<Session> {
        let claims = self.verify_id_token(id_token)?;
        let profile = LineProfile {
            display_name: claims.name.unwrap_or_else(|| claims.sub.clone()),
            user_id: claims.sub,
            picture_url: claims.picture,
        };
        info!(user_id = %profile.user_id, "Signed in with ID token");
        let session = Session::Authenticated(profile);
        *self.session.write().await = session.clone();
        Ok(session)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<LineProfile> {
        let url = format!("{}/v2/profile", self.config.api_url.trim_end_matches('/'));
        debug!(url = %url, "Fetching LINE profile");

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_api_error("line", &format!("HTTP {}", status), Some(&body));
            return Err(StallBoardError::Authentication(format!(
                "LINE rejected the access token (HTTP {})",
                status.as_u16()
            )));
        }

        Ok(response.json::<LineProfile>().await?)
    }
}

#[async_trait]
impl LoginProvider for LineLoginClient {
    async fn init(&self) -> Result<()> {
        if self.config.channel_id.trim().is_empty() {
            return Err(StallBoardError::Config("line.channel_id is not set".to_string()));
        }
        debug!(liff_id = %self.config.liff_id, "LINE login initialized");
        Ok(())
    }

    async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    async fn login(&self, access_token: &str) -> Result<Session> {
        let profile = self.fetch_profile(access_token).await?;
        info!(user_id = %profile.user_id, "Signed in with LINE");
        let session = Session::Authenticated(profile);
        *self.session.write().await = session.clone();
        Ok(session)
    }

    async fn profile(&self) -> Result<LineProfile> {
        self.session.read().await.require().cloned()
    }

    async fn logout(&self) {
        *self.session.write().await = Session::Anonymous;
    }
}

/// Console access checks on top of a session
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn LoginProvider>,
    settings: Settings,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("admins", &self.settings.admin.line_user_ids.len())
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(provider: Arc<dyn LoginProvider>, settings: Settings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &Arc<dyn LoginProvider> {
        &self.provider
    }

    /// Bootstrap a session from an access token
    pub async fn authenticate(&self, access_token: &str) -> Result<Session> {
        self.provider.init().await?;
        self.provider.login(access_token).await
    }

    pub fn is_admin(&self, session: &Session) -> bool {
        session.user_id().map_or(false, |id| self.settings.is_admin(id))
    }

    /// The profile of a configured administrator
    pub fn require_admin<'a>(&self, session: &'a Session) -> Result<&'a LineProfile> {
        let profile = session.require()?;
        if !self.settings.is_admin(&profile.user_id) {
            warn!(user_id = %profile.user_id, "Non-admin tried to open the admin console");
            return Err(StallBoardError::PermissionDenied(
                "administrator access required".to_string(),
            ));
        }
        log_admin_action(&profile.user_id, "admin_console_access", None, None);
        Ok(profile)
    }
}
