//! HTTP surface of the server.

pub mod ai;
pub mod auth;
pub mod error;
pub mod health;
pub mod orders;
pub mod request_tracing;
pub mod static_files;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use customflow_core::image::{MAX_REQUEST_BYTES, UPLOAD_URL_PREFIX};
use serde_json::json;

use crate::app::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Builds the full router: the authenticated API, upload serving and the 404 fallback.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route(
            "/orders/:id",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/orders/:id/status", put(orders::update_order_status))
        .route("/upload", post(uploads::upload_files))
        .route("/ai/ocr", post(ai::extract_text))
        .route("/ai/reply", post(ai::generate_reply))
        .route("/ai/model", get(ai::model_info))
        .route("/ai/parameters", put(ai::update_parameters))
        .route_layer(from_fn_with_state(state.clone(), auth::require_principal));

    Router::new()
        .nest(API_PREFIX, api)
        .route(
            &format!("{UPLOAD_URL_PREFIX}/:filename"),
            get(static_files::serve_upload),
        )
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(from_fn(request_tracing::request_tracing_middleware))
        .with_state(state)
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}
