//! Multipart image uploads.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use customflow_core::CustomFlowError;
use customflow_core::image::StoredImage;
use serde::Serialize;

use crate::app::AppState;
use crate::http::error::{ApiError, ApiResult};

/// Multipart field carrying the files.
pub const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub message: String,
    pub uploaded_count: usize,
    pub failed_count: usize,
    pub files: Vec<StoredImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_files: Vec<String>,
}

/// Stores every `files` part independently.
///
/// Rejected parts are listed as `"<name> (<reason>)"`. The response is 400
/// when nothing was stored.
pub async fn upload_files(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let mut multipart = multipart
        .map_err(|rejection| CustomFlowError::validation("files", rejection.body_text()))?;

    let mut files = Vec::new();
    let mut failed_files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CustomFlowError::validation("files", format!("Failed to read upload: {e}")))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| CustomFlowError::validation("files", format!("Failed to read upload: {e}")))?;

        match state.images.store(&original_name, &bytes).await {
            Ok(stored) => files.push(stored),
            Err(reason) => {
                tracing::warn!(%original_name, %reason, "Upload rejected");
                failed_files.push(format!("{original_name} ({reason})"));
            }
        }
    }

    let processed = files.len() + failed_files.len();
    if processed == 0 {
        return Err(ApiError(CustomFlowError::validation(
            "files",
            "No files uploaded",
        )));
    }

    tracing::info!(
        uploaded = files.len(),
        failed = failed_files.len(),
        "Upload processed"
    );
    let status = if files.is_empty() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    let summary = UploadSummary {
        message: format!("Processed {processed} files"),
        uploaded_count: files.len(),
        failed_count: failed_files.len(),
        files,
        failed_files,
    };
    Ok((status, Json(summary)).into_response())
}
