use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ClinicStructure;

/// Clinic display info and workflow configuration. Singleton row in the
/// database; the `structure` field drives which pages are active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicSettings {
    pub clinic_id: Uuid,
    pub name: String,
    pub address: String,
    pub logo_path: Option<String>,
    pub currency: String,
    pub structure: ClinicStructure,
    /// The single practitioner in one-man mode.
    pub main_doctor_id: Option<Uuid>,
    /// Bill due-date window in days from issue.
    pub receipt_validity_days: u32,
}

impl ClinicSettings {
    pub fn defaults() -> Self {
        Self {
            clinic_id: Uuid::new_v4(),
            name: "Clinic".to_string(),
            address: String::new(),
            logo_path: None,
            currency: "USD".to_string(),
            structure: ClinicStructure::FullWorkflow,
            main_doctor_id: None,
            receipt_validity_days: 7,
        }
    }
}
