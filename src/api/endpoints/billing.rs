//! Bill composition: price the prescription lines and snapshot the totals.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::billing::{self, TaxConfig};
use crate::db;
use crate::models::enums::TaxType;
use crate::models::Prescription;

#[derive(Deserialize)]
pub struct ComposeBillRequest {
    pub prescription_id: Uuid,
    /// One price per prescription line, in item order. `null` entries
    /// are billed at zero but left unpriced on the stored line.
    pub prices: Vec<Option<f64>>,
    #[serde(default = "default_tax_type")]
    pub tax_type: TaxType,
    #[serde(default)]
    pub tax_percent: f64,
    #[serde(default)]
    pub appointment_fee: f64,
    /// Hand-entered signed rounding adjustment.
    #[serde(default)]
    pub round_off: f64,
}

fn default_tax_type() -> TaxType {
    TaxType::None
}

/// `POST /api/bills` — compute and attach a bill to a prescription.
pub async fn compose(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Json(req): Json<ComposeBillRequest>,
) -> Result<Json<Prescription>, ApiError> {
    let conn = ctx.core.open_db()?;
    let rx = db::get_prescription(&conn, &req.prescription_id)?.ok_or_else(|| {
        ApiError::NotFound(format!("Prescription {} not found", req.prescription_id))
    })?;

    if req.prices.len() != rx.items.len() {
        return Err(ApiError::Validation(format!(
            "Invalid prices: expected {} entries, got {}",
            rx.items.len(),
            req.prices.len()
        )));
    }

    let settings = db::get_or_init_settings(&conn)?;
    let priced: Vec<f64> = req.prices.iter().map(|p| p.unwrap_or(0.0)).collect();

    let bill = billing::compute_bill(
        &priced,
        TaxConfig {
            tax_type: req.tax_type,
            percent: req.tax_percent,
        },
        req.appointment_fee,
        req.round_off,
        settings.receipt_validity_days,
        Utc::now().date_naive(),
    );

    db::attach_bill(&conn, &rx.id, &bill, &req.prices)?;

    let updated = db::get_prescription(&conn, &rx.id)?.ok_or_else(|| {
        ApiError::NotFound(format!("Prescription {} not found", rx.id))
    })?;

    tracing::info!(rx = %rx.id, total = bill.total, "Bill composed");
    ctx.core.update_activity();
    Ok(Json(updated))
}
