//! Event create / edit form
//!
//! Creation turns blank text into `null`; an edit leaves blank fields out of
//! the patch so stored values are never overwritten with nothing.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{validate_email, validate_phone, validate_required, ValidationErrors};
use crate::models::event::Event;

/// Text columns copied verbatim from the form
const TEXT_FIELDS: [&str; 6] = [
    "name",
    "description",
    "genre",
    "venue_name",
    "venue_address",
    "main_image_url",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub name: String,
    pub description: String,
    pub genre: String,
    pub venue_name: String,
    pub venue_address: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub application_deadline: String,
    pub booth_fee: String,
    pub booth_count: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub main_image_url: String,
    pub additional_image_urls: Vec<String>,
    /// `None` leaves the stored flag alone on edit and means unpublished on create
    pub is_published: Option<bool>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| "Date must be YYYY-MM-DD".to_string())
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| "Time must be HH:MM".to_string())
}

fn parse_amount(raw: &str) -> Result<i32, String> {
    let digits: String = crate::utils::helpers::to_half_width(raw.trim()).replace(',', "");
    digits
        .parse::<i32>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| "Must be a whole number of zero or more".to_string())
}

impl EventForm {
    /// Prefill an edit form from the stored row
    pub fn from_event(event: &Event) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: event.name.clone(),
            description: text(&event.description),
            genre: text(&event.genre),
            venue_name: text(&event.venue_name),
            venue_address: text(&event.venue_address),
            start_date: event.start_date.format("%Y-%m-%d").to_string(),
            end_date: event.end_date.format("%Y-%m-%d").to_string(),
            start_time: event.start_time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
            end_time: event.end_time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
            application_deadline: event
                .application_deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            booth_fee: event.booth_fee.map(|n| n.to_string()).unwrap_or_default(),
            booth_count: event.booth_count.map(|n| n.to_string()).unwrap_or_default(),
            contact_email: text(&event.contact_email),
            contact_phone: text(&event.contact_phone),
            main_image_url: text(&event.main_image_url),
            additional_image_urls: event.additional_image_urls.clone(),
            is_published: Some(event.is_published),
        }
    }

    /// Check every field in form order
    ///
    /// `creating` requires the name and both dates; an edit only validates
    /// what was filled in.
    pub fn validate(&self, creating: bool) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if creating || !self.name.trim().is_empty() {
            errors.check("name", validate_required(&self.name, "Event name"));
        }

        let start = self.check_date(&mut errors, "start_date", &self.start_date, creating);
        let end = self.check_date(&mut errors, "end_date", &self.end_date, creating);
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add("end_date", "End date must not be before the start date");
            }
        }

        if !self.start_time.trim().is_empty() {
            errors.check("start_time", parse_time(&self.start_time));
        }
        if !self.end_time.trim().is_empty() {
            errors.check("end_time", parse_time(&self.end_time));
        }

        if let Some(deadline) = self.check_date(&mut errors, "application_deadline", &self.application_deadline, false) {
            if start.map_or(false, |start| deadline > start) {
                errors.add("application_deadline", "Application deadline must be on or before the start date");
            }
        }

        if !self.booth_fee.trim().is_empty() {
            errors.check("booth_fee", parse_amount(&self.booth_fee));
        }
        if !self.booth_count.trim().is_empty() {
            errors.check("booth_count", parse_amount(&self.booth_count));
        }
        if !self.contact_email.trim().is_empty() {
            errors.check("contact_email", validate_email(&self.contact_email));
        }
        if !self.contact_phone.trim().is_empty() {
            errors.check("contact_phone", validate_phone(&self.contact_phone));
        }

        errors
    }

    fn check_date(
        &self,
        errors: &mut ValidationErrors,
        field: &'static str,
        raw: &str,
        required: bool,
    ) -> Option<NaiveDate> {
        if raw.trim().is_empty() {
            if required {
                errors.add(field, "Date is required");
            }
            return None;
        }
        errors.check(field, parse_date(raw))
    }

    /// Column values for every field that has input, normalized
    fn filled_columns(&self) -> Map<String, Value> {
        let mut columns = Map::new();

        let texts = [
            &self.name,
            &self.description,
            &self.genre,
            &self.venue_name,
            &self.venue_address,
            &self.main_image_url,
        ];
        for (column, value) in TEXT_FIELDS.iter().zip(texts) {
            let value = value.trim();
            if !value.is_empty() {
                columns.insert(column.to_string(), Value::String(value.to_string()));
            }
        }

        for (column, raw) in [
            ("start_date", &self.start_date),
            ("end_date", &self.end_date),
            ("application_deadline", &self.application_deadline),
        ] {
            if let Ok(date) = parse_date(raw) {
                columns.insert(column.to_string(), Value::String(date.format("%Y-%m-%d").to_string()));
            }
        }

        for (column, raw) in [("start_time", &self.start_time), ("end_time", &self.end_time)] {
            if let Ok(time) = parse_time(raw) {
                columns.insert(column.to_string(), Value::String(time.format("%H:%M:%S").to_string()));
            }
        }

        for (column, raw) in [("booth_fee", &self.booth_fee), ("booth_count", &self.booth_count)] {
            if let Ok(amount) = parse_amount(raw) {
                columns.insert(column.to_string(), Value::from(amount));
            }
        }

        if let Ok(email) = validate_email(&self.contact_email) {
            columns.insert("contact_email".to_string(), Value::String(email));
        }
        if let Ok(phone) = validate_phone(&self.contact_phone) {
            columns.insert("contact_phone".to_string(), Value::String(phone));
        }

        columns
    }

    /// Insert payload: every column present, blank input as `null`
    pub fn to_insert_payload(&self, organizer_id: &str) -> Value {
        let filled = self.filled_columns();
        let mut payload = Map::new();

        for column in EDITABLE_COLUMNS {
            payload.insert(column.to_string(), filled.get(column).cloned().unwrap_or(Value::Null));
        }
        payload.insert("organizer_id".to_string(), Value::String(organizer_id.to_string()));
        payload.insert(
            "additional_image_urls".to_string(),
            Value::from(self.non_blank_images()),
        );
        payload.insert("is_published".to_string(), Value::Bool(self.is_published.unwrap_or(false)));

        Value::Object(payload)
    }

    /// Update patch: blank input is left out entirely
    pub fn to_update_patch(&self) -> Value {
        let mut patch = self.filled_columns();

        let images = self.non_blank_images();
        if !images.is_empty() {
            patch.insert("additional_image_urls".to_string(), Value::from(images));
        }
        if let Some(published) = self.is_published {
            patch.insert("is_published".to_string(), Value::Bool(published));
        }
        patch.insert("updated_at".to_string(), serde_json::json!(Utc::now()));

        Value::Object(patch)
    }

    fn non_blank_images(&self) -> Vec<String> {
        self.additional_image_urls
            .iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect()
    }
}

/// Columns an organizer edits through the form
const EDITABLE_COLUMNS: [&str; 15] = [
    "name",
    "description",
    "genre",
    "venue_name",
    "venue_address",
    "start_date",
    "end_date",
    "start_time",
    "end_time",
    "application_deadline",
    "booth_fee",
    "booth_count",
    "contact_email",
    "contact_phone",
    "main_image_url",
];
