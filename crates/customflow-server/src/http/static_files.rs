use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::app::AppState;
use crate::http::error::ApiError;

/// Serves a stored upload. Unsafe or unknown names are 404.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    match state.images.read(&filename).await {
        Ok(Some(bytes)) => {
            let mime = mime_guess::from_path(&filename).first_or_octet_stream();
            ([(CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "File not found" })),
        )
            .into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}
