//! Field-level validation rules
//!
//! Every check normalizes first (full-width to half-width, separators
//! stripped) and validates the normalized text.

use std::sync::OnceLock;

use regex::Regex;

use crate::utils::helpers::{strip_separators, to_half_width};

/// A field that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field errors in form order; the first one is the field to focus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record the outcome of a check that returns an error message
    pub fn check<T>(&mut self, field: &'static str, outcome: Result<T, String>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&FieldError> {
        self.0.first()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok` when clean, otherwise the first invalid field as an error
    pub fn into_result(self) -> crate::utils::errors::Result<()> {
        match self.0.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(crate::utils::errors::StallBoardError::Validation {
                field: first.field.to_string(),
                message: first.message,
            }),
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .unwrap_or_else(|_| unreachable!("email pattern is a valid regex"))
    })
}

/// Normalize a phone number: half-width digits, separators removed
pub fn normalize_phone(raw: &str) -> String {
    strip_separators(raw.trim())
}

/// Normalize, then require 10 to 15 digits
pub fn validate_phone(raw: &str) -> Result<String, String> {
    let phone = normalize_phone(raw);
    if phone.is_empty() {
        return Err("Phone number is required".to_string());
    }
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err("Phone number may only contain digits".to_string());
    }
    if !(10..=15).contains(&phone.len()) {
        return Err("Phone number must be 10 to 15 digits".to_string());
    }
    Ok(phone)
}

/// Normalize a postal code to bare digits
pub fn normalize_postal_code(raw: &str) -> String {
    strip_separators(raw.trim()).trim_start_matches('〒').to_string()
}

/// Normalize, then require exactly 7 digits
pub fn validate_postal_code(raw: &str) -> Result<String, String> {
    let code = normalize_postal_code(raw);
    if code.len() == 7 && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(code)
    } else {
        Err("Postal code must be 7 digits".to_string())
    }
}

pub fn validate_email(raw: &str) -> Result<String, String> {
    let email = to_half_width(raw.trim());
    if email.is_empty() {
        return Err("Email address is required".to_string());
    }
    if email_regex().is_match(&email) {
        Ok(email)
    } else {
        Err("Email address is not valid".to_string())
    }
}

pub fn validate_required(raw: &str, label: &str) -> Result<String, String> {
    let value = raw.trim();
    if value.is_empty() {
        Err(format!("{} is required", label))
    } else {
        Ok(value.to_string())
    }
}

pub fn validate_url(raw: &str) -> Result<String, String> {
    let value = raw.trim();
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(value.to_string()),
        _ => Err("URL must start with http:// or https://".to_string()),
    }
}

/// Size and type pre-check before an upload
pub fn validate_upload(size: u64, content_type: &str, max_bytes: u64, allowed: &[String]) -> Result<(), String> {
    if size == 0 {
        return Err("File is empty".to_string());
    }
    if size > max_bytes {
        return Err(format!("File must be {} MB or smaller", max_bytes / (1024 * 1024)));
    }
    if !allowed.iter().any(|mime| mime.eq_ignore_ascii_case(content_type)) {
        return Err(format!("File type {} is not allowed", content_type));
    }
    Ok(())
}
