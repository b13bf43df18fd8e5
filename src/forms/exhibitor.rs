//! Exhibitor (store) registration form

use serde::{Deserialize, Serialize};

use super::address::AddressFields;
use super::validation::{
    validate_email, validate_phone, validate_postal_code, validate_required, ValidationErrors,
};
use crate::models::exhibitor::NewExhibitor;
use crate::utils::helpers::non_empty;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhibitorForm {
    pub name: String,
    pub shop_name: String,
    pub genre: String,
    pub phone: String,
    pub email: String,
    #[serde(flatten)]
    pub address: AddressFields,
    pub description: String,
    pub agreed_to_terms: bool,
}

impl ExhibitorForm {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check("name", validate_required(&self.name, "Name"));
        errors.check("shop_name", validate_required(&self.shop_name, "Shop name"));
        errors.check("phone", validate_phone(&self.phone));
        errors.check("email", validate_email(&self.email));
        if !self.address.postal_code.trim().is_empty() {
            errors.check("postal_code", validate_postal_code(&self.address.postal_code));
        }
        if !self.agreed_to_terms {
            errors.add("agreed_to_terms", "You must agree to the terms of use");
        }
        errors
    }

    /// Insert payload without document URLs; those are set after upload
    pub fn to_new_exhibitor(&self, line_user_id: &str) -> NewExhibitor {
        NewExhibitor {
            line_user_id: line_user_id.to_string(),
            name: self.name.trim().to_string(),
            shop_name: self.shop_name.trim().to_string(),
            genre: non_empty(&self.genre),
            phone: validate_phone(&self.phone).unwrap_or_else(|_| self.phone.trim().to_string()),
            email: validate_email(&self.email).unwrap_or_else(|_| self.email.trim().to_string()),
            postal_code: validate_postal_code(&self.address.postal_code).ok(),
            prefecture: non_empty(&self.address.prefecture),
            city: non_empty(&self.address.city),
            address_line: non_empty(&self.address.address_line),
            description: non_empty(&self.description),
            business_license_url: None,
            vehicle_inspection_url: None,
            liability_insurance_url: None,
            fire_equipment_url: None,
        }
    }
}
