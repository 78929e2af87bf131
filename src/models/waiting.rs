use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::VisitStatus;

/// One visit instance linking a patient to an assigned doctor.
/// Carries the lifecycle status that the waiting-room workflow advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingEntry {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub status: VisitStatus,
    pub created_at: NaiveDateTime,
}

/// Waiting-list row joined with patient and doctor display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingCard {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub status: VisitStatus,
    pub created_at: NaiveDateTime,
}
