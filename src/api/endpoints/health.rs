//! `GET /api/health` — liveness and busy indicator.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub suggest_busy: bool,
    pub idle_secs: u64,
}

pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
        suggest_busy: ctx.core.suggestions().is_busy(),
        idle_secs: ctx.core.idle_secs(),
    }))
}
