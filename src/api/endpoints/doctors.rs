//! Doctor management and the per-doctor PIN gate.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::auth;
use crate::db;
use crate::models::Doctor;
use crate::validation;

#[derive(Serialize)]
pub struct DoctorListResponse {
    pub doctors: Vec<Doctor>,
}

/// `GET /api/doctors`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
) -> Result<Json<DoctorListResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let doctors = db::get_all_doctors(&conn)?;
    ctx.core.update_activity();
    Ok(Json(DoctorListResponse { doctors }))
}

#[derive(Deserialize)]
pub struct DoctorRequest {
    pub name: String,
    pub specialization: String,
    pub initials: String,
    /// 4-digit PIN; omit to leave the dashboard ungated.
    pub pin: Option<String>,
}

/// `POST /api/doctors`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Json(req): Json<DoctorRequest>,
) -> Result<Json<Doctor>, ApiError> {
    validation::validate_name(&req.name)?;
    let pin_hash = hash_optional_pin(req.pin.as_deref())?;

    let doctor = Doctor {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        specialization: req.specialization.trim().to_string(),
        initials: req.initials.trim().to_uppercase(),
        pin_hash,
    };

    let conn = ctx.core.open_db()?;
    db::insert_doctor(&conn, &doctor)?;

    tracing::info!(doctor = %doctor.id, "Doctor added");
    ctx.core.update_activity();
    Ok(Json(doctor))
}

/// `PUT /api/doctors/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<DoctorRequest>,
) -> Result<Json<Doctor>, ApiError> {
    validation::validate_name(&req.name)?;

    let conn = ctx.core.open_db()?;
    let existing = db::get_doctor(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Doctor {id} not found")))?;

    // Absent pin keeps the stored one; supplying a pin replaces it
    let pin_hash = match req.pin.as_deref() {
        Some(pin) => hash_optional_pin(Some(pin))?,
        None => existing.pin_hash,
    };

    let doctor = Doctor {
        id,
        name: req.name.trim().to_string(),
        specialization: req.specialization.trim().to_string(),
        initials: req.initials.trim().to_uppercase(),
        pin_hash,
    };
    db::update_doctor(&conn, &doctor)?;

    ctx.core.update_activity();
    Ok(Json(doctor))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// `DELETE /api/doctors/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    db::delete_doctor(&conn, &id)?;
    ctx.core.update_activity();
    Ok(Json(DeleteResponse { deleted: true }))
}

#[derive(Deserialize)]
pub struct VerifyPinRequest {
    pub pin: String,
}

#[derive(Serialize)]
pub struct VerifyPinResponse {
    pub verified: bool,
}

/// `POST /api/doctors/:id/verify-pin` — gate for the per-doctor dashboard.
pub async fn verify_pin(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifyPinRequest>,
) -> Result<Json<VerifyPinResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let doctor = db::get_doctor(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Doctor {id} not found")))?;

    let stored = doctor.pin_hash.as_deref().ok_or(ApiError::InvalidCredentials)?;
    auth::verify_pin(&req.pin, stored)?;

    ctx.core.update_activity();
    Ok(Json(VerifyPinResponse { verified: true }))
}

fn hash_optional_pin(pin: Option<&str>) -> Result<Option<String>, ApiError> {
    match pin {
        Some(pin) => {
            validation::validate_pin(pin)?;
            Ok(Some(auth::hash_pin(pin)?))
        }
        None => Ok(None),
    }
}
