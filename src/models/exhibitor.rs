//! Exhibitor model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhibitor {
    pub id: String,
    pub line_user_id: String,
    pub name: String,
    pub shop_name: String,
    pub genre: Option<String>,
    pub phone: String,
    pub email: String,
    pub postal_code: Option<String>,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub address_line: Option<String>,
    pub description: Option<String>,
    pub business_license_url: Option<String>,
    pub vehicle_inspection_url: Option<String>,
    pub liability_insurance_url: Option<String>,
    pub fire_equipment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExhibitor {
    pub line_user_id: String,
    pub name: String,
    pub shop_name: String,
    pub genre: Option<String>,
    pub phone: String,
    pub email: String,
    pub postal_code: Option<String>,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub address_line: Option<String>,
    pub description: Option<String>,
    pub business_license_url: Option<String>,
    pub vehicle_inspection_url: Option<String>,
    pub liability_insurance_url: Option<String>,
    pub fire_equipment_url: Option<String>,
}

/// Documents an exhibitor can attach to the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    BusinessLicense,
    VehicleInspection,
    LiabilityInsurance,
    FireEquipment,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::BusinessLicense,
        DocumentKind::VehicleInspection,
        DocumentKind::LiabilityInsurance,
        DocumentKind::FireEquipment,
    ];

    /// Storage folder name
    pub fn slug(&self) -> &'static str {
        match self {
            DocumentKind::BusinessLicense => "business-license",
            DocumentKind::VehicleInspection => "vehicle-inspection",
            DocumentKind::LiabilityInsurance => "liability-insurance",
            DocumentKind::FireEquipment => "fire-equipment",
        }
    }

    /// Column holding the public URL
    pub fn column(&self) -> &'static str {
        match self {
            DocumentKind::BusinessLicense => "business_license_url",
            DocumentKind::VehicleInspection => "vehicle_inspection_url",
            DocumentKind::LiabilityInsurance => "liability_insurance_url",
            DocumentKind::FireEquipment => "fire_equipment_url",
        }
    }
}

impl NewExhibitor {
    pub fn set_document_url(&mut self, kind: DocumentKind, url: String) {
        let slot = match kind {
            DocumentKind::BusinessLicense => &mut self.business_license_url,
            DocumentKind::VehicleInspection => &mut self.vehicle_inspection_url,
            DocumentKind::LiabilityInsurance => &mut self.liability_insurance_url,
            DocumentKind::FireEquipment => &mut self.fire_equipment_url,
        };
        *slot = Some(url);
    }
}
