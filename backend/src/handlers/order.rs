//! HTTP handlers for customer order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::Order;

use crate::error::AppResult;
use crate::services::input::required_id;
use crate::services::order::{
    AppendOutcome, InsertOrderInput, OrderItemInput, OrderQuery, OrderService, OrderTransition,
    UpdateOrderInput,
};
use crate::AppState;

/// Place an order and take stock for its items
pub async fn insert_order(
    State(state): State<AppState>,
    Json(input): Json<InsertOrderInput>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let service = OrderService::new(state.store.clone(), state.store_timeout());
    let order = service.insert_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Replace order fields; a cancel returns stock
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateOrderInput>,
) -> AppResult<Json<OrderTransition>> {
    let id = required_id("id", &id)?;
    let service = OrderService::new(state.store.clone(), state.store_timeout());
    let transition = service.update_order(id, input).await?;
    Ok(Json(transition))
}

/// Append items to an existing order
pub async fn append_order_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(items): Json<Vec<OrderItemInput>>,
) -> AppResult<Json<AppendOutcome>> {
    let id = required_id("id", &id)?;
    let service = OrderService::new(state.store.clone(), state.store_timeout());
    let outcome = service.append_items(id, items).await?;
    Ok(Json(outcome))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = required_id("id", &id)?;
    let service = OrderService::new(state.store.clone(), state.store_timeout());
    service.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let id = required_id("id", &id)?;
    let service = OrderService::new(state.store.clone(), state.store_timeout());
    let order = service.get_order(id).await?;
    Ok(Json(order))
}

/// List orders filtered by id, customer or status
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.store.clone(), state.store_timeout());
    let orders = service.list_orders(query).await?;
    Ok(Json(orders))
}
