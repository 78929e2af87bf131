use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{PrescriptionStatus, TaxType};

/// A prescription produced when a waiting entry reaches `sent_to_pharmacy`.
/// The item list is immutable after creation; only the status flips when
/// the pharmacy dispenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub waiting_entry_id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub items: Vec<PrescriptionItem>,
    pub advice: Option<String>,
    pub status: PrescriptionStatus,
    pub created_at: NaiveDateTime,
    pub bill: Option<BillDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionItem {
    pub name: String,
    /// Entered at bill-generation time; None until then.
    pub price: Option<f64>,
}

/// Computed pricing breakdown for a consultation.
///
/// Invariant: `total == subtotal + tax_amount + appointment_fee + round_off`.
/// The stored columns are a snapshot of the computation, not re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillDetails {
    pub tax_type: TaxType,
    pub tax_percent: f64,
    pub tax_amount: f64,
    pub appointment_fee: f64,
    /// Hand-entered signed rounding adjustment.
    pub round_off: f64,
    pub subtotal: f64,
    pub total: f64,
    pub due_date: NaiveDate,
}
