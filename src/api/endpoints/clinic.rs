//! Clinic settings and the page-visibility check.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::models::ClinicSettings;
use crate::validation;
use crate::visibility::{self, NavigationOutcome};

/// `GET /api/settings` — singleton clinic settings, created on first read.
pub async fn settings_get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
) -> Result<Json<ClinicSettings>, ApiError> {
    let conn = ctx.core.open_db()?;
    let settings = db::get_or_init_settings(&conn)?;
    ctx.core.update_activity();
    Ok(Json(settings))
}

/// `PUT /api/settings` — replace the settings row. Last write wins.
pub async fn settings_put(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Json(settings): Json<ClinicSettings>,
) -> Result<Json<ClinicSettings>, ApiError> {
    validation::validate_name(&settings.name)?;
    if settings.receipt_validity_days == 0 {
        return Err(ApiError::Validation(
            "Invalid receipt_validity_days: must be at least 1".into(),
        ));
    }

    let conn = ctx.core.open_db()?;
    db::save_settings(&conn, &settings)?;

    tracing::info!(structure = ?settings.structure, "Settings saved");
    ctx.core.update_activity();
    Ok(Json(settings))
}

#[derive(Deserialize)]
pub struct NavigationQuery {
    pub path: String,
}

#[derive(Serialize)]
pub struct NavigationResponse {
    #[serde(flatten)]
    pub outcome: NavigationOutcome,
    pub redirect: Option<&'static str>,
}

/// `GET /api/navigation/check?path=` — visibility gate for a page path.
/// The caller is authenticated (this route is protected), so the only
/// redirect here is the disallowed-page one.
pub async fn navigation(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Query(query): Query<NavigationQuery>,
) -> Result<Json<NavigationResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let settings = db::get_or_init_settings(&conn)?;

    let outcome = visibility::route_navigation(true, settings.structure, &query.path);
    Ok(Json(NavigationResponse {
        redirect: outcome.redirect_target(),
        outcome,
    }))
}
