//! Public read-only share pages.
//!
//! `/share/bill/:id` and `/share/prescription/:composite` serve documents
//! without authentication. The prescription link uses a composite id of
//! `{clinicId}_{prescriptionId}`, split on the first underscore; a wrong
//! clinic id is indistinguishable from an unknown document.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{BillDetails, Prescription};

#[derive(Serialize)]
pub struct SharedBillResponse {
    pub clinic_name: String,
    pub prescription: Prescription,
    pub bill: BillDetails,
}

/// `GET /share/bill/:id`
pub async fn bill(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SharedBillResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let rx = db::get_prescription(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("This bill does not exist or has expired".into()))?;
    let bill = rx
        .bill
        .clone()
        .ok_or_else(|| ApiError::NotFound("This bill does not exist or has expired".into()))?;
    let settings = db::get_or_init_settings(&conn)?;

    Ok(Json(SharedBillResponse {
        clinic_name: settings.name,
        prescription: rx,
        bill,
    }))
}

#[derive(Serialize)]
pub struct SharedPrescriptionResponse {
    pub clinic_name: String,
    pub prescription: Prescription,
}

/// `GET /share/prescription/:composite`
pub async fn prescription(
    State(ctx): State<ApiContext>,
    Path(composite): Path<String>,
) -> Result<Json<SharedPrescriptionResponse>, ApiError> {
    let (clinic_id, rx_id) = parse_composite_id(&composite)?;

    let conn = ctx.core.open_db()?;
    let settings = db::get_or_init_settings(&conn)?;
    if settings.clinic_id != clinic_id {
        return Err(not_found());
    }

    let rx = db::get_prescription(&conn, &rx_id)?.ok_or_else(not_found)?;

    Ok(Json(SharedPrescriptionResponse {
        clinic_name: settings.name,
        prescription: rx,
    }))
}

fn not_found() -> ApiError {
    ApiError::NotFound("This prescription does not exist or has expired".into())
}

/// Split `{clinicId}_{prescriptionId}` on the first underscore.
fn parse_composite_id(composite: &str) -> Result<(Uuid, Uuid), ApiError> {
    let (clinic_part, rx_part) = composite
        .split_once('_')
        .ok_or_else(|| ApiError::BadRequest("Malformed document id".into()))?;
    let clinic_id = Uuid::parse_str(clinic_part)
        .map_err(|_| ApiError::BadRequest("Malformed document id".into()))?;
    let rx_id = Uuid::parse_str(rx_part)
        .map_err(|_| ApiError::BadRequest("Malformed document id".into()))?;
    Ok((clinic_id, rx_id))
}
