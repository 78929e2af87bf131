//! `GET /api/documents/:id/pdf` — printable bill / prescription export.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::db;
use crate::document::{self, DocType};

#[derive(Deserialize)]
pub struct PdfQuery {
    /// `bill` or `prescription` (default).
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
}

pub async fn download(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<PdfQuery>,
) -> Result<Response, ApiError> {
    let doc_type = match query.doc_type.as_deref() {
        None | Some("prescription") => DocType::Prescription,
        Some("bill") => DocType::Bill,
        Some(other) => {
            return Err(ApiError::BadRequest(format!("Unknown document type: {other}")))
        }
    };

    let (rx, settings) = {
        let conn = ctx.core.open_db()?;
        let rx = db::get_prescription(&conn, &id)?
            .ok_or_else(|| ApiError::NotFound(format!("Prescription {id} not found")))?;
        let settings = db::get_or_init_settings(&conn)?;
        (rx, settings)
    };

    if doc_type == DocType::Bill && rx.bill.is_none() {
        return Err(ApiError::Conflict("No bill attached to this prescription".into()));
    }

    let filename = document::export_filename(doc_type, &rx.patient_name, &rx.id);

    // printpdf rendering is CPU-bound, keep it off the async runtime
    let bytes = tokio::task::spawn_blocking(move || {
        document::render_document(doc_type, &rx, &settings)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("render task: {e}")))??;

    ctx.core.update_activity();

    let disposition = format!("attachment; filename=\"{filename}\"");
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"))
        .header(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition)
                .map_err(|e| ApiError::Internal(format!("header: {e}")))?,
        )
        .body(axum::body::Body::from(bytes))
        .map_err(|e| ApiError::Internal(format!("response: {e}")))
}
