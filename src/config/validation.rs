//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{StallBoardError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_supabase_config(&settings.supabase)?;
    validate_storage_config(&settings.storage)?;
    validate_line_config(&settings.line)?;
    validate_postal_config(&settings.postal)?;
    validate_draft_config(&settings.drafts)?;
    validate_invitation_config(&settings.invitations)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate hosted store configuration
fn validate_supabase_config(config: &super::SupabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(StallBoardError::Config(
            "Supabase URL is required".to_string()
        ));
    }

    url::Url::parse(&config.url)?;

    if config.anon_key.is_empty() {
        return Err(StallBoardError::Config(
            "Supabase anon key is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(StallBoardError::Config(
            "Supabase timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.bucket_documents.is_empty() || config.bucket_event_images.is_empty() {
        return Err(StallBoardError::Config(
            "Storage bucket names are required".to_string()
        ));
    }

    if config.max_upload_bytes == 0 {
        return Err(StallBoardError::Config(
            "Max upload size must be greater than 0".to_string()
        ));
    }

    if config.allowed_mime_types.is_empty() {
        return Err(StallBoardError::Config(
            "At least one allowed MIME type is required".to_string()
        ));
    }

    Ok(())
}

/// Validate LINE Login configuration
fn validate_line_config(config: &super::LineConfig) -> Result<()> {
    if config.channel_id.is_empty() {
        return Err(StallBoardError::Config(
            "LINE channel ID is required".to_string()
        ));
    }

    if config.api_url.is_empty() {
        return Err(StallBoardError::Config(
            "LINE API URL is required".to_string()
        ));
    }

    Ok(())
}

/// Validate postal lookup configuration
fn validate_postal_config(config: &super::PostalConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(StallBoardError::Config(
            "Postal API URL is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(StallBoardError::Config(
            "Postal timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate draft autosave configuration
fn validate_draft_config(config: &super::DraftConfig) -> Result<()> {
    if config.enabled && config.debounce_ms == 0 {
        return Err(StallBoardError::Config(
            "Draft debounce must be greater than 0 when drafts are enabled".to_string()
        ));
    }

    Ok(())
}

/// Validate invitation configuration
fn validate_invitation_config(config: &super::InvitationConfig) -> Result<()> {
    if config.ttl_days <= 0 {
        return Err(StallBoardError::Config(
            "Invitation TTL must be at least one day".to_string()
        ));
    }

    if !(6..=32).contains(&config.code_length) {
        return Err(StallBoardError::Config(
            format!("Invitation code length must be between 6 and 32, got {}", config.code_length)
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(StallBoardError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(StallBoardError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
