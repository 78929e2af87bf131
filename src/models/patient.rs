use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Gender;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub age: Option<u32>,
    pub gender: Gender,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
}

/// One entry in a patient's visit history. Appended at each consultation,
/// never edited afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub visit_date: NaiveDate,
    pub note: String,
    pub doctor_name: String,
}
