//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub organizer_id: String,
    pub name: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub application_deadline: Option<NaiveDate>,
    pub booth_fee: Option<i32>,
    pub booth_count: Option<i32>,
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub additional_image_urls: Vec<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Whether exhibitors may still apply on `today`
    pub fn accepts_applications(&self, today: NaiveDate) -> bool {
        if !self.is_published {
            return false;
        }
        match self.application_deadline {
            Some(deadline) => today <= deadline,
            None => today <= self.start_date,
        }
    }
}
