//! Organizer registration form

use serde::{Deserialize, Serialize};

use super::address::AddressFields;
use super::validation::{
    validate_email, validate_phone, validate_postal_code, validate_required, validate_url,
    ValidationErrors,
};
use crate::models::organizer::NewOrganizer;
use crate::utils::helpers::non_empty;

/// Raw input of the organizer registration form, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerForm {
    pub organization_name: String,
    pub representative_name: String,
    pub email: String,
    pub phone: String,
    #[serde(flatten)]
    pub address: AddressFields,
    pub website_url: String,
    pub description: String,
    pub agreed_to_terms: bool,
}

impl OrganizerForm {
    /// Check every field in form order
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check("organization_name", validate_required(&self.organization_name, "Organization name"));
        errors.check("representative_name", validate_required(&self.representative_name, "Representative name"));
        errors.check("email", validate_email(&self.email));
        errors.check("phone", validate_phone(&self.phone));
        if !self.address.postal_code.trim().is_empty() {
            errors.check("postal_code", validate_postal_code(&self.address.postal_code));
        }
        if !self.website_url.trim().is_empty() {
            errors.check("website_url", validate_url(&self.website_url));
        }
        if !self.agreed_to_terms {
            errors.add("agreed_to_terms", "You must agree to the terms of use");
        }
        errors
    }

    /// Normalized insert payload; call after [`validate`](Self::validate) passed
    pub fn to_new_organizer(&self, line_user_id: &str) -> NewOrganizer {
        NewOrganizer {
            line_user_id: line_user_id.to_string(),
            organization_name: self.organization_name.trim().to_string(),
            representative_name: self.representative_name.trim().to_string(),
            email: validate_email(&self.email).unwrap_or_else(|_| self.email.trim().to_string()),
            phone: validate_phone(&self.phone).unwrap_or_else(|_| self.phone.trim().to_string()),
            postal_code: validate_postal_code(&self.address.postal_code).ok(),
            prefecture: non_empty(&self.address.prefecture),
            city: non_empty(&self.address.city),
            address_line: non_empty(&self.address.address_line),
            website_url: non_empty(&self.website_url),
            description: non_empty(&self.description),
            is_approved: false,
        }
    }
}
