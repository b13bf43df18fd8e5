//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

/// Characters used for invitation codes; omits 0/O and 1/I/L.
const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Generate a new UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a random invitation code of the given length
pub fn generate_invite_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| INVITE_ALPHABET[rng.gen_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}

/// Normalize a user-typed invitation code
pub fn normalize_invite_code(code: &str) -> String {
    to_half_width(code.trim()).to_uppercase()
}

/// Convert full-width ASCII variants (U+FF01..U+FF5E) to half-width
pub fn to_half_width(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}

/// Keep only the ASCII digits of a normalized string
///
/// Hyphens, long dashes, spaces and parentheses are the separators people type
/// in phone numbers and postal codes; anything else is kept so the digit
/// check fails.
pub fn strip_separators(input: &str) -> String {
    to_half_width(input)
        .chars()
        .filter(|c| !matches!(c, '-' | ' ' | '(' | ')' | '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{30FC}'))
        .collect()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Convert an empty or whitespace-only string into `None`
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Build a storage object path for an upload
pub fn upload_path(owner_id: &str, kind: &str, file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}/{}/{}.{}", owner_id, kind, generate_uuid(), ext),
        None => format!("{}/{}/{}", owner_id, kind, generate_uuid()),
    }
}
