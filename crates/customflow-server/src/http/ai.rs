//! OCR and reply drafting endpoints under `/api/v1/ai`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use customflow_application::{OcrResult, ReplyRequest, ReplyResult};
use customflow_core::ai::{ModelInfo, ParameterUpdate};
use customflow_core::auth::Principal;
use serde::Deserialize;

use crate::app::AppState;
use crate::http::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct OcrBody {
    #[serde(default)]
    pub images: Vec<String>,
}

pub async fn extract_text(
    State(state): State<AppState>,
    payload: Result<Json<OcrBody>, JsonRejection>,
) -> ApiResult<Json<OcrResult>> {
    let Json(body) = payload?;
    Ok(Json(state.assistant.extract_text(&body.images).await?))
}

pub async fn generate_reply(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<ReplyRequest>, JsonRejection>,
) -> ApiResult<Json<ReplyResult>> {
    let Json(request) = payload?;
    Ok(Json(state.assistant.generate_reply(&principal, request).await?))
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.assistant.model_info().await)
}

pub async fn update_parameters(
    State(state): State<AppState>,
    payload: Result<Json<ParameterUpdate>, JsonRejection>,
) -> ApiResult<Json<ModelInfo>> {
    let Json(update) = payload?;
    Ok(Json(state.assistant.update_parameters(update).await))
}
