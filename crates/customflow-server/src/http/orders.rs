//! Order endpoints under `/api/v1/orders`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, response::IntoResponse};
use customflow_application::ListOrdersQuery;
use customflow_core::CustomFlowError;
use customflow_core::auth::Principal;
use customflow_core::order::OrderDraft;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::app::AppState;
use crate::http::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// Path ids are numeric primary keys.
pub(crate) fn parse_id(raw: &str) -> Result<i64, CustomFlowError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CustomFlowError::validation("id", "Invalid order ID format"))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Json<Value>> {
    let page = state.orders.list(query).await?;
    Ok(Json(json!({
        "orders": page.orders,
        "pagination": page.pagination(),
    })))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let order = state.orders.get(parse_id(&id)?).await?;
    Ok(Json(json!({ "order": order })))
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let order = state.orders.create(draft, &principal).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "order": order,
            "message": "Order created successfully",
        })),
    ))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id)?;
    let Json(draft) = payload?;
    let order = state.orders.update(id, draft).await?;
    Ok(Json(json!({
        "order": order,
        "message": "Order updated successfully",
    })))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id)?;
    let Json(body) = payload?;
    let order = state.orders.update_status(id, &body.status).await?;
    Ok(Json(json!({
        "order": order,
        "message": "Order status updated successfully",
    })))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.orders.delete(parse_id(&id)?).await?;
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}
