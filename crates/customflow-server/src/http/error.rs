//! Mapping of domain errors onto HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use customflow_core::CustomFlowError;
use serde_json::{Value, json};

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub CustomFlowError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<CustomFlowError> for ApiError {
    fn from(err: CustomFlowError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CustomFlowError::validation("body", rejection.body_text()))
    }
}

/// Status code for a domain error.
pub fn status_for(err: &CustomFlowError) -> StatusCode {
    match err {
        CustomFlowError::Validation { .. } => StatusCode::BAD_REQUEST,
        CustomFlowError::Conflict { .. } => StatusCode::CONFLICT,
        CustomFlowError::NotFound { .. } => StatusCode::NOT_FOUND,
        CustomFlowError::NoTextExtracted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CustomFlowError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        CustomFlowError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        CustomFlowError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        CustomFlowError::Storage(_)
        | CustomFlowError::Io { .. }
        | CustomFlowError::Serialization { .. }
        | CustomFlowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn body_for(err: &CustomFlowError) -> Value {
    match err {
        CustomFlowError::Validation { field, .. } => {
            json!({ "error": err.to_string(), "field": field })
        }
        CustomFlowError::Conflict { message, existing } => {
            json!({ "error": message, "existing_order": existing })
        }
        CustomFlowError::NotFound { entity_type, .. } => {
            json!({ "error": format!("{} not found", capitalize(entity_type)) })
        }
        CustomFlowError::NoTextExtracted { .. } | CustomFlowError::Unauthorized(_) => {
            json!({ "error": err.to_string() })
        }
        CustomFlowError::Config(_) => json!({ "error": "Service is not configured" }),
        CustomFlowError::Upstream { status, .. } => {
            json!({ "error": "AI service request failed", "upstream_status": status })
        }
        _ => json!({ "error": "Internal server error" }),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if self.0.is_internal_detail() || status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "Request rejected");
        }
        (status, Json(body_for(&self.0))).into_response()
    }
}
