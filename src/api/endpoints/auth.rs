//! Login / logout endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::auth;
use crate::db;
use crate::models::ClinicSettings;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Email-style identity derived from the username.
    pub identity: String,
    pub clinic: ClinicSettings,
}

/// `POST /api/auth/login` — unprotected, rate-limited.
///
/// Unknown username and wrong password both produce the same
/// invalid-credentials response.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.trim().to_lowercase();

    let conn = ctx.core.open_db()?;
    let account = db::get_account(&conn, &username)?.ok_or(ApiError::InvalidCredentials)?;
    auth::verify_password(&req.password, &account.password_hash)?;

    let settings = db::get_or_init_settings(&conn)?;

    let token = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.issue(&username)
    };

    tracing::info!(%username, "Login");
    ctx.core.update_activity();

    Ok(Json(LoginResponse {
        token,
        identity: auth::login_identity(&username),
        clinic: settings,
    }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// `POST /api/auth/logout` — revoke the caller's session.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    sessions.revoke(&user.token);
    tracing::info!(username = %user.username, "Logout");
    Ok(Json(LogoutResponse { logged_out: true }))
}
