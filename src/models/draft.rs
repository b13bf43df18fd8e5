//! Form draft model

use std::fmt;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// One saved draft per (user, form type)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    pub user_id: String,
    pub form_type: String,
    pub payload: serde_json::Value,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftUpsert<'a> {
    pub user_id: &'a str,
    pub form_type: String,
    pub payload: &'a serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Which form a draft belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormType {
    OrganizerRegistration,
    ExhibitorRegistration,
    EventCreate,
    EventEdit(String),
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormType::OrganizerRegistration => f.write_str("organizer_registration"),
            FormType::ExhibitorRegistration => f.write_str("exhibitor_registration"),
            FormType::EventCreate => f.write_str("event_create"),
            FormType::EventEdit(event_id) => write!(f, "event_edit:{}", event_id),
        }
    }
}

impl std::str::FromStr for FormType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "organizer_registration" => Ok(FormType::OrganizerRegistration),
            "exhibitor_registration" => Ok(FormType::ExhibitorRegistration),
            "event_create" => Ok(FormType::EventCreate),
            other => match other.strip_prefix("event_edit:") {
                Some(id) if !id.is_empty() => Ok(FormType::EventEdit(id.to_string())),
                _ => Err(format!("unknown form type: {}", other)),
            },
        }
    }
}
