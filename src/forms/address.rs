//! Address block shared by the organizer and exhibitor forms

use serde::{Deserialize, Serialize};

use crate::services::postal::PostalAddress;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressFields {
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub address_line: String,
}

impl AddressFields {
    /// Fill the address from a successful postal lookup
    ///
    /// The street part the user already typed is kept when the lookup only
    /// knows the town.
    pub fn apply_lookup(&mut self, postal_code: &str, address: &PostalAddress) {
        self.postal_code = postal_code.to_string();
        self.prefecture = address.prefecture.clone();
        self.city = address.city.clone();
        if !self.address_line.starts_with(&address.town) || self.address_line.is_empty() {
            self.address_line = address.town.clone();
        }
    }
}
