//! Patient registration, lookup, and visit history.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::enums::Gender;
use crate::models::{HistoryEntry, Patient};
use crate::validation;

#[derive(Deserialize)]
pub struct PatientListQuery {
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct PatientListResponse {
    pub patients: Vec<Patient>,
}

/// `GET /api/patients?search=` — all patients, or a name/phone search.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Query(query): Query<PatientListQuery>,
) -> Result<Json<PatientListResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let patients = match query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(term) => db::search_patients(&conn, term)?,
        None => db::get_all_patients(&conn)?,
    };
    ctx.core.update_activity();
    Ok(Json(PatientListResponse { patients }))
}

#[derive(Deserialize)]
pub struct RegisterPatientRequest {
    pub name: String,
    pub phone: String,
    pub age: Option<u32>,
    pub gender: Gender,
    pub address: Option<String>,
}

/// `POST /api/patients` — register a new patient.
pub async fn register(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Json(req): Json<RegisterPatientRequest>,
) -> Result<Json<Patient>, ApiError> {
    validation::validate_name(&req.name)?;
    validation::validate_phone(&req.phone)?;
    validation::validate_age(req.age)?;

    let patient = Patient {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        phone: req.phone.trim().to_string(),
        age: req.age,
        gender: req.gender,
        address: req.address,
        created_at: Utc::now().naive_utc(),
    };

    let conn = ctx.core.open_db()?;
    db::insert_patient(&conn, &patient)?;

    tracing::info!(patient = %patient.id, "Patient registered");
    ctx.core.update_activity();
    Ok(Json(patient))
}

#[derive(Serialize)]
pub struct PatientDetailResponse {
    pub patient: Patient,
    pub history: Vec<HistoryEntry>,
}

/// `GET /api/patients/:id` — patient with full visit history.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientDetailResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let patient = db::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Patient {id} not found")))?;
    let history = db::get_patient_history(&conn, &id)?;
    ctx.core.update_activity();
    Ok(Json(PatientDetailResponse { patient, history }))
}

#[derive(Deserialize)]
pub struct AddHistoryRequest {
    pub note: String,
    pub doctor_name: String,
}

/// `POST /api/patients/:id/history` — append a visit note.
pub async fn add_history(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddHistoryRequest>,
) -> Result<Json<HistoryEntry>, ApiError> {
    if req.note.trim().is_empty() {
        return Err(ApiError::Validation("Invalid note: must not be empty".into()));
    }

    let conn = ctx.core.open_db()?;
    db::get_patient(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("Patient {id} not found")))?;

    let entry = HistoryEntry {
        id: Uuid::new_v4(),
        patient_id: id,
        visit_date: Utc::now().date_naive(),
        note: req.note.trim().to_string(),
        doctor_name: req.doctor_name,
    };
    db::insert_history_entry(&conn, &entry)?;

    ctx.core.update_activity();
    Ok(Json(entry))
}
