//! AI drug-suggestion endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::suggest::{ActiveSuggestion, GenerateClient, Suggestion};

#[derive(Deserialize)]
pub struct SuggestRequest {
    /// When set, the stored visit history is used as context.
    pub patient_id: Option<Uuid>,
    /// Free-text history override; takes precedence over `patient_id`.
    pub history: Option<String>,
    pub complaint: String,
}

/// `POST /api/suggest` — one stateless call to the generation backend.
pub async fn run(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<Suggestion>, ApiError> {
    if req.complaint.trim().is_empty() {
        return Err(ApiError::Validation("Invalid complaint: must not be empty".into()));
    }

    let history = match (&req.history, req.patient_id) {
        (Some(text), _) => text.clone(),
        (None, Some(patient_id)) => {
            let conn = ctx.core.open_db()?;
            db::get_patient_history(&conn, &patient_id)?
                .iter()
                .map(|e| format!("{}: {} ({})", e.visit_date, e.note, e.doctor_name))
                .collect::<Vec<_>>()
                .join("\n")
        }
        (None, None) => String::new(),
    };

    let core = ctx.core.clone();
    let complaint = req.complaint.clone();

    // Blocking HTTP call to the model backend, off the async runtime
    let suggestion = tokio::task::spawn_blocking(move || {
        let client = GenerateClient::from_config();
        core.suggestions().suggest(&client, &history, &complaint)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("suggest task: {e}")))??;

    ctx.core.update_activity();
    Ok(Json(suggestion))
}

#[derive(Serialize)]
pub struct SuggestStatusResponse {
    pub busy: bool,
    pub current: Option<ActiveSuggestion>,
}

/// `GET /api/suggest/status` — busy indicator for the UI.
pub async fn status(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
) -> Result<Json<SuggestStatusResponse>, ApiError> {
    Ok(Json(SuggestStatusResponse {
        busy: ctx.core.suggestions().is_busy(),
        current: ctx.core.suggestions().current_operation(),
    }))
}
