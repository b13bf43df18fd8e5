//! Error handling for StallBoard
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use serde::Deserialize;
use thiserror::Error;

/// Main error type for StallBoard application
#[derive(Error, Debug)]
pub enum StallBoardError {
    #[error("Data store error: {0}")]
    Store(#[from] StoreError),

    #[error("Postal lookup error: {0}")]
    Postal(#[from] PostalError),

    #[error("Storage upload error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Organizer not found: {organizer_id}")]
    OrganizerNotFound { organizer_id: String },

    #[error("Exhibitor not found for user: {user_id}")]
    ExhibitorNotFound { user_id: String },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: String },

    #[error("Application not found: {application_id}")]
    ApplicationNotFound { application_id: String },

    #[error("Invitation code not found")]
    InvitationNotFound,

    #[error("Invitation code has already been used")]
    InvitationAlreadyUsed,

    #[error("Invitation code has expired")]
    InvitationExpired,

    #[error("User is already a member of this organizer")]
    AlreadyMember,

    #[error("Membership {member_id} was created but invitation {invitation_id} could not be marked as used: {source}")]
    InvitationMarkFailed {
        member_id: String,
        invitation_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Exhibitor has already applied to this event")]
    DuplicateApplication,

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Validation failed on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors reported by the hosted data store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store answered with an error body
    #[error("{}", .0.best_message())]
    Api(ApiErrorBody),

    #[error("Store request failed: {0}")]
    RequestFailed(String),

    #[error("Store request timed out")]
    Timeout,

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    #[error("Expected exactly one row from {table}, got {count}")]
    NotSingle { table: String, count: usize },

    #[error("Unique constraint violated on {table}")]
    Conflict { table: String },
}

/// Error body returned by the hosted store
///
/// Every field is optional; the raw body is kept for the stringify fallback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
    #[serde(skip)]
    pub status: u16,
    #[serde(skip)]
    pub raw: String,
}

impl ApiErrorBody {
    /// Parse an error body, keeping the raw text when it is not JSON
    pub fn parse(status: u16, raw: &str) -> Self {
        let mut body = serde_json::from_str::<ApiErrorBody>(raw).unwrap_or_default();
        body.status = status;
        body.raw = raw.to_string();
        body
    }

    /// `message` → `details` → `hint` → stringified body
    pub fn best_message(&self) -> String {
        [&self.message, &self.details, &self.hint]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| {
                if self.raw.is_empty() {
                    format!("HTTP {}", self.status)
                } else {
                    self.raw.clone()
                }
            })
    }

    /// PostgreSQL unique violation
    pub fn is_unique_violation(&self) -> bool {
        self.code.as_deref() == Some("23505") || self.status == 409
    }
}

/// Postal code lookup errors
#[derive(Error, Debug)]
pub enum PostalError {
    #[error("Postal code must be 7 digits")]
    InvalidCode,

    #[error("No address found for postal code {0}")]
    NotFound(String),

    #[error("Postal API returned status {status}: {message}")]
    Api { status: i64, message: String },

    #[error("Postal API request failed: {0}")]
    RequestFailed(String),
}

/// Result type alias for StallBoard operations
pub type Result<T> = std::result::Result<T, StallBoardError>;

/// Result type alias for data store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StallBoardError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            StallBoardError::Store(StoreError::Timeout) => true,
            StallBoardError::Store(StoreError::RequestFailed(_)) => true,
            StallBoardError::Store(_) => false,
            StallBoardError::Postal(PostalError::RequestFailed(_)) => true,
            StallBoardError::Postal(_) => false,
            StallBoardError::Storage(_) => true,
            StallBoardError::Config(_) => false,
            StallBoardError::NotAuthenticated => false,
            StallBoardError::PermissionDenied(_) => false,
            StallBoardError::OrganizerNotFound { .. } => false,
            StallBoardError::ExhibitorNotFound { .. } => false,
            StallBoardError::EventNotFound { .. } => false,
            StallBoardError::ApplicationNotFound { .. } => false,
            StallBoardError::InvitationNotFound => false,
            StallBoardError::InvitationAlreadyUsed => false,
            StallBoardError::InvitationExpired => false,
            StallBoardError::AlreadyMember => false,
            StallBoardError::InvitationMarkFailed { .. } => false,
            StallBoardError::DuplicateApplication => false,
            StallBoardError::InvalidStateTransition { .. } => false,
            StallBoardError::Validation { .. } => false,
            StallBoardError::Http(_) => true,
            StallBoardError::Serialization(_) => false,
            StallBoardError::Token(_) => false,
            StallBoardError::Io(_) => true,
            StallBoardError::UrlParse(_) => false,
            StallBoardError::Authentication(_) => false,
            StallBoardError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StallBoardError::Config(_) => ErrorSeverity::Critical,
            StallBoardError::InvitationMarkFailed { .. } => ErrorSeverity::Critical,
            StallBoardError::NotAuthenticated => ErrorSeverity::Warning,
            StallBoardError::PermissionDenied(_) => ErrorSeverity::Warning,
            StallBoardError::Authentication(_) => ErrorSeverity::Warning,
            StallBoardError::InvalidInput(_) => ErrorSeverity::Info,
            StallBoardError::Validation { .. } => ErrorSeverity::Info,
            StallBoardError::InvitationNotFound
            | StallBoardError::InvitationAlreadyUsed
            | StallBoardError::InvitationExpired
            | StallBoardError::AlreadyMember
            | StallBoardError::DuplicateApplication => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Text shown to the end user in the blocking alert
    pub fn user_message(&self) -> String {
        match self {
            StallBoardError::Store(StoreError::Api(body)) => body.best_message(),
            StallBoardError::Validation { message, .. } => message.clone(),
            StallBoardError::Postal(PostalError::NotFound(_)) => {
                "No address was found for this postal code".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
