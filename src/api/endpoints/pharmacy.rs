//! Pharmacy queue and dispensing.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::Prescription;
use crate::workflow;

#[derive(Serialize)]
pub struct PharmacyQueueResponse {
    pub queue: Vec<Prescription>,
}

/// `GET /api/pharmacy` — pending prescriptions, oldest first.
pub async fn queue(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
) -> Result<Json<PharmacyQueueResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let queue = db::get_pharmacy_queue(&conn)?;
    ctx.core.update_activity();
    Ok(Json(PharmacyQueueResponse { queue }))
}

/// `POST /api/pharmacy/:id/dispense` — flip a prescription to dispensed
/// and close out the visit.
pub async fn dispense(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Prescription>, ApiError> {
    let conn = ctx.core.open_db()?;
    let (prescription, notification) = workflow::mark_dispensed(&conn, &id)?;

    if let Some((kind, message)) = &notification {
        ctx.core.notify(*kind, message);
    }

    tracing::info!(rx = %id, "Prescription dispensed");
    ctx.core.update_activity();
    Ok(Json(prescription))
}
