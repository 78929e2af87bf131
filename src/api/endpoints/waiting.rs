//! Waiting-room board and status transitions.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::enums::VisitStatus;
use crate::models::{Prescription, WaitingCard, WaitingEntry};
use crate::workflow;

#[derive(Serialize)]
pub struct WaitingBoardResponse {
    pub entries: Vec<WaitingCard>,
}

/// `GET /api/waiting` — the live board, dispensed visits excluded.
pub async fn board(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
) -> Result<Json<WaitingBoardResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let entries = db::get_waiting_board(&conn)?;
    ctx.core.update_activity();
    Ok(Json(WaitingBoardResponse { entries }))
}

#[derive(Deserialize)]
pub struct AddWaitingRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}

/// `POST /api/waiting` — put a patient in the waiting room.
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Json(req): Json<AddWaitingRequest>,
) -> Result<Json<WaitingEntry>, ApiError> {
    let conn = ctx.core.open_db()?;
    db::get_patient(&conn, &req.patient_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Patient {} not found", req.patient_id)))?;
    db::get_doctor(&conn, &req.doctor_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Doctor {} not found", req.doctor_id)))?;

    let entry = WaitingEntry {
        id: Uuid::new_v4(),
        patient_id: req.patient_id,
        doctor_id: req.doctor_id,
        status: VisitStatus::Waiting,
        created_at: Utc::now().naive_utc(),
    };
    db::insert_waiting_entry(&conn, &entry)?;

    tracing::info!(entry = %entry.id, "Waiting entry added");
    ctx.core.update_activity();
    Ok(Json(entry))
}

#[derive(Deserialize)]
pub struct AdvanceRequest {
    pub new_status: VisitStatus,
    /// Prescription lines; consumed by the sent_to_pharmacy transition.
    #[serde(default)]
    pub items: Vec<String>,
    pub advice: Option<String>,
}

#[derive(Serialize)]
pub struct AdvanceResponse {
    pub entry: WaitingEntry,
    pub prescription: Option<Prescription>,
}

/// `POST /api/waiting/:id/status` — advance a visit through the workflow.
pub async fn advance(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let settings = db::get_or_init_settings(&conn)?;

    let outcome = workflow::advance_status(
        &conn,
        settings.structure,
        &id,
        req.new_status,
        req.items,
        req.advice,
    )?;

    if let Some((kind, message)) = &outcome.notification {
        ctx.core.notify(*kind, message);
    }

    ctx.core.update_activity();
    Ok(Json(AdvanceResponse {
        entry: outcome.entry,
        prescription: outcome.prescription,
    }))
}
