//! Test data helpers for creating test objects
//!
//! Builders for LINE profiles, filled-in forms and raw table rows to seed the
//! in-memory store with.

use chrono::{Duration, NaiveDate, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};

use StallBoard::forms::{AddressFields, EventForm, ExhibitorForm, OrganizerForm};
use StallBoard::services::{LineProfile, Upload};

pub const ADMIN_USER_ID: &str = "Uadmin0000000000000000000000000000";
pub const OWNER_USER_ID: &str = "Uowner0000000000000000000000000000";
pub const MEMBER_USER_ID: &str = "Umember000000000000000000000000000";
pub const STORE_USER_ID: &str = "Ustore0000000000000000000000000000";

/// A LINE profile with a generated display name
pub fn line_profile(user_id: &str) -> LineProfile {
    LineProfile {
        user_id: user_id.to_string(),
        display_name: Name().fake(),
        picture_url: None,
    }
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

fn hamamatsu_address() -> AddressFields {
    AddressFields {
        postal_code: "430-0929".to_string(),
        prefecture: "静岡県".to_string(),
        city: "浜松市中央区".to_string(),
        address_line: "中央1-2-3".to_string(),
    }
}

/// Organizer registration that passes validation
pub fn organizer_form() -> OrganizerForm {
    OrganizerForm {
        organization_name: CompanyName().fake(),
        representative_name: Name().fake(),
        email: SafeEmail().fake(),
        phone: "053-123-4567".to_string(),
        address: hamamatsu_address(),
        website_url: "https://market.example.jp".to_string(),
        description: "Weekend farmers market".to_string(),
        agreed_to_terms: true,
    }
}

/// Store registration that passes validation
pub fn exhibitor_form() -> ExhibitorForm {
    ExhibitorForm {
        name: Name().fake(),
        shop_name: format!("{} Kitchen", CompanyName().fake::<String>()),
        genre: "food".to_string(),
        phone: "０９０－１２３４－５６７８".to_string(),
        email: SafeEmail().fake(),
        address: hamamatsu_address(),
        description: "Crepes and coffee".to_string(),
        agreed_to_terms: true,
    }
}

/// Event form with the required fields filled
pub fn event_form(start: &str, end: &str) -> EventForm {
    EventForm {
        name: "Harbor Night Market".to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
        ..Default::default()
    }
}

pub fn organizer_row(id: &str, owner: &str, approved: bool) -> Value {
    json!({
        "id": id,
        "line_user_id": owner,
        "organization_name": format!("Organizer {}", id),
        "representative_name": "Aoi Tanaka",
        "email": "info@organizer.example.jp",
        "phone": "0531234567",
        "is_approved": approved,
    })
}

pub fn member_row(organizer_id: &str, user_id: &str, role: &str) -> Value {
    json!({
        "organizer_id": organizer_id,
        "line_user_id": user_id,
        "display_name": "Member",
        "role": role,
    })
}

pub fn exhibitor_row(id: &str, user_id: &str) -> Value {
    json!({
        "id": id,
        "line_user_id": user_id,
        "name": "Ren Sato",
        "shop_name": format!("Shop {}", id),
        "phone": "09012345678",
        "email": "ren@example.jp",
    })
}

pub fn event_row(id: &str, organizer_id: &str, start: &str, deadline: Option<&str>, published: bool) -> Value {
    json!({
        "id": id,
        "organizer_id": organizer_id,
        "name": format!("Event {}", id),
        "start_date": start,
        "end_date": start,
        "application_deadline": deadline,
        "is_published": published,
    })
}

pub fn application_row(id: &str, event_id: &str, exhibitor_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "event_id": event_id,
        "exhibitor_id": exhibitor_id,
        "status": status,
    })
}

/// An active invitation expiring `ttl_days` from now (negative for expired)
pub fn invitation_row(id: &str, organizer_id: &str, code: &str, role: &str, ttl_days: i64) -> Value {
    json!({
        "id": id,
        "organizer_id": organizer_id,
        "code": code,
        "role": role,
        "status": "active",
        "expires_at": Utc::now() + Duration::days(ttl_days),
        "created_by": OWNER_USER_ID,
    })
}

pub fn png_upload(file_name: &str) -> Upload {
    Upload::new(file_name, "image/png", vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3])
}

pub fn pdf_upload(file_name: &str) -> Upload {
    Upload::new(file_name, "application/pdf", b"%PDF-1.4 test".to_vec())
}
