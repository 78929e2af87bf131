//! `GET /api/notifications` — drain buffered workflow notifications.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::core_state::Notification;

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// Consumes the buffer: each notification is delivered once.
pub async fn drain(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let notifications = ctx.core.drain_notifications();
    Ok(Json(NotificationsResponse { notifications }))
}
