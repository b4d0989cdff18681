use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;

use crate::app::AppState;

/// Reports database reachability and whether the AI gateway has a key.
pub async fn health(State(state): State<AppState>) -> Response {
    let timestamp = Utc::now().to_rfc3339();
    let ai_service = if state.assistant.model_info().await.has_api_key {
        "configured"
    } else {
        "fallback"
    };

    match state.orders.ping().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "timestamp": timestamp,
            "database": "connected",
            "ai_service": ai_service,
            "version": env!("CARGO_PKG_VERSION"),
        }))
        .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "timestamp": timestamp,
                    "database": "disconnected",
                    "ai_service": ai_service,
                    "error": "Database connection failed",
                })),
            )
                .into_response()
        }
    }
}
