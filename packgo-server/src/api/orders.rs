//! Order endpoints
//!
//! Handlers return as soon as the mutation is persisted. Side effects keep
//! running on their own task. Unreadable bodies are rejected with
//! `ValidationFailed` in the shared error envelope.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use shared::Identity;
use shared::error::AppError;
use shared::order::{
    CreateOrderRequest, DeleteOrderResponse, Order, OrderView, SubmitReviewRequest,
    UpdateOrderRequest,
};

use crate::state::AppState;

use super::ApiResult;

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<Order>> {
    Ok(Json(state.orders.list(&identity).await?))
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let Json(req) = payload?;
    let created = state.orders.create(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(created.value)))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<String>,
) -> ApiResult<OrderView> {
    Ok(Json(state.orders.get(&identity, &order_id).await?))
}

/// PUT /orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<String>,
    payload: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let Json(req) = payload?;
    let updated = state.orders.update(&identity, &order_id, req).await?;
    Ok(Json(updated.value))
}

/// DELETE /orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<String>,
) -> ApiResult<DeleteOrderResponse> {
    let deleted = state.orders.delete(&identity, &order_id).await?;
    Ok(Json(deleted.value))
}

/// POST /orders/{id}/review
pub async fn submit_review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<String>,
    payload: Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let Json(req) = payload?;
    let reviewed = state.orders.review(&identity, &order_id, req).await?;
    Ok(Json(reviewed.value))
}
