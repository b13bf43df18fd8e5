//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub supabase: SupabaseConfig,
    pub storage: StorageConfig,
    pub line: LineConfig,
    pub postal: PostalConfig,
    pub drafts: DraftConfig,
    pub invitations: InvitationConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// Hosted store connection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_seconds: u64,
}

/// Blob storage buckets and upload limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub bucket_documents: String,
    pub bucket_event_images: String,
    pub max_upload_bytes: u64,
    pub allowed_mime_types: Vec<String>,
}

/// LINE Login configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineConfig {
    pub channel_id: String,
    pub channel_secret: Option<String>,
    pub liff_id: String,
    pub api_url: String,
}

/// Postal-code lookup API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostalConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
}

/// Draft autosave behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DraftConfig {
    pub enabled: bool,
    pub debounce_ms: u64,
}

/// Organizer invitation codes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvitationConfig {
    pub ttl_days: i64,
    pub code_length: usize,
}

/// Administrator console access
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    pub line_user_ids: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    ///
    /// Defaults are layered under the file, so a partial `config.toml` is
    /// enough. Nested keys use a double underscore, e.g.
    /// `STALLBOARD_SUPABASE__URL`.
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("STALLBOARD")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("admin.line_user_ids")
                    .with_list_parse_key("storage.allowed_mime_types")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load settings from an explicit TOML file on top of the defaults
    pub fn from_file(path: &std::path::Path) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::StallBoardError> {
        super::validation::validate_settings(self)
    }

    /// Whether the given LINE user may open the admin console
    pub fn is_admin(&self, line_user_id: &str) -> bool {
        self.admin.line_user_ids.iter().any(|id| id == line_user_id)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supabase: SupabaseConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: String::new(),
                timeout_seconds: 10,
            },
            storage: StorageConfig {
                bucket_documents: "exhibitor-documents".to_string(),
                bucket_event_images: "event-images".to_string(),
                max_upload_bytes: 10 * 1024 * 1024,
                allowed_mime_types: vec![
                    "image/jpeg".to_string(),
                    "image/png".to_string(),
                    "image/webp".to_string(),
                    "image/gif".to_string(),
                    "application/pdf".to_string(),
                ],
            },
            line: LineConfig {
                channel_id: String::new(),
                channel_secret: None,
                liff_id: String::new(),
                api_url: "https://api.line.me".to_string(),
            },
            postal: PostalConfig {
                api_url: "https://zipcloud.ibsnet.co.jp/api/search".to_string(),
                timeout_seconds: 5,
            },
            drafts: DraftConfig {
                enabled: true,
                debounce_ms: 800,
            },
            invitations: InvitationConfig {
                ttl_days: 7,
                code_length: 8,
            },
            admin: AdminConfig {
                line_user_ids: vec![],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "./logs".to_string(),
            },
        }
    }
}
