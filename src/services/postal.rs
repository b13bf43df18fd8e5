//! Postal code lookup service
//!
//! Resolves a 7-digit Japanese postal code to prefecture, city and town via
//! the zipcloud search API, and fills address form fields from the result.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::settings::PostalConfig;
use crate::forms::address::AddressFields;
use crate::forms::validation::validate_postal_code;
use crate::utils::errors::{PostalError, Result, StallBoardError};
use crate::utils::logging::log_api_error;

/// zipcloud response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostalResponse {
    pub status: i64,
    pub message: Option<String>,
    pub results: Option<Vec<PostalResult>>,
}

/// One zipcloud match
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostalResult {
    pub zipcode: Option<String>,
    pub address1: String,
    pub address2: String,
    pub address3: String,
}

/// A resolved address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub prefecture: String,
    pub city: String,
    pub town: String,
}

impl From<PostalResult> for PostalAddress {
    fn from(result: PostalResult) -> Self {
        Self {
            prefecture: result.address1,
            city: result.address2,
            town: result.address3,
        }
    }
}

/// What a lookup did to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Address fields were filled in
    Filled(PostalAddress),
    /// Fields left untouched; the message is shown to the user
    Alert(String),
}

impl LookupOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, LookupOutcome::Filled(_))
    }
}

/// Postal lookup service
#[derive(Clone, Debug)]
pub struct PostalService {
    client: Client,
    api_url: String,
}

impl PostalService {
    /// Create a new PostalService instance
    pub fn new(config: &PostalConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("StallBoard/1.0")
            .build()
            .map_err(StallBoardError::Http)?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Resolve a postal code to its first matching address
    pub async fn lookup(&self, postal_code: &str) -> Result<PostalAddress> {
        let code = validate_postal_code(postal_code).map_err(|_| PostalError::InvalidCode)?;
        debug!(postal_code = %code, "Looking up postal code");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("zipcode", code.as_str())])
            .send()
            .await
            .map_err(|e| PostalError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PostalError::Api {
                status: i64::from(status.as_u16()),
                message: if body.is_empty() { status.to_string() } else { body },
            }
            .into());
        }

        let body: PostalResponse = response
            .json()
            .await
            .map_err(|e| PostalError::RequestFailed(format!("Failed to parse postal response: {}", e)))?;

        if body.status != 200 {
            return Err(PostalError::Api {
                status: body.status,
                message: body.message.unwrap_or_default(),
            }
            .into());
        }

        let first = body
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| PostalError::NotFound(code.clone()))?;

        info!(postal_code = %code, prefecture = %first.address1, "Postal code resolved");
        Ok(first.into())
    }

    /// Look up the form's postal code and fill the address on success
    ///
    /// Any failure leaves `fields` untouched and yields an alert message.
    pub async fn fill_address(&self, fields: &mut AddressFields) -> LookupOutcome {
        let raw = fields.postal_code.clone();
        match self.lookup(&raw).await {
            Ok(address) => {
                let code = validate_postal_code(&raw).unwrap_or(raw);
                fields.apply_lookup(&code, &address);
                LookupOutcome::Filled(address)
            }
            Err(e) => {
                warn!(postal_code = %raw, error = %e, "Postal lookup failed");
                if !matches!(e, StallBoardError::Postal(PostalError::InvalidCode | PostalError::NotFound(_))) {
                    log_api_error("postal", &e.to_string(), Some(&raw));
                }
                LookupOutcome::Alert(e.user_message())
            }
        }
    }
}
