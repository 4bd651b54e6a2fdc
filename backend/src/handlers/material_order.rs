//! HTTP handlers for material order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::MaterialOrder;

use crate::error::AppResult;
use crate::services::input::required_id;
use crate::services::material_order::{
    InsertMaterialOrderInput, MaterialAppendOutcome, MaterialOrderItemInput, MaterialOrderQuery,
    MaterialOrderService, MaterialOrderTransition, UpdateMaterialOrderInput,
};
use crate::AppState;

pub async fn insert_material_order(
    State(state): State<AppState>,
    Json(input): Json<InsertMaterialOrderInput>,
) -> AppResult<(StatusCode, Json<MaterialOrder>)> {
    let service = MaterialOrderService::new(state.store.clone(), state.store_timeout());
    let order = service.insert_material_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Replace material order fields; receiving or cancelling moves stock
pub async fn update_material_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateMaterialOrderInput>,
) -> AppResult<Json<MaterialOrderTransition>> {
    let id = required_id("id", &id)?;
    let service = MaterialOrderService::new(state.store.clone(), state.store_timeout());
    let transition = service.update_material_order(id, input).await?;
    Ok(Json(transition))
}

pub async fn append_material_order_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(items): Json<Vec<MaterialOrderItemInput>>,
) -> AppResult<Json<MaterialAppendOutcome>> {
    let id = required_id("id", &id)?;
    let service = MaterialOrderService::new(state.store.clone(), state.store_timeout());
    let outcome = service.append_items(id, items).await?;
    Ok(Json(outcome))
}

pub async fn delete_material_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = required_id("id", &id)?;
    let service = MaterialOrderService::new(state.store.clone(), state.store_timeout());
    service.delete_material_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_material_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MaterialOrder>> {
    let id = required_id("id", &id)?;
    let service = MaterialOrderService::new(state.store.clone(), state.store_timeout());
    let order = service.get_material_order(id).await?;
    Ok(Json(order))
}

pub async fn list_material_orders(
    State(state): State<AppState>,
    Query(query): Query<MaterialOrderQuery>,
) -> AppResult<Json<Vec<MaterialOrder>>> {
    let service = MaterialOrderService::new(state.store.clone(), state.store_timeout());
    let orders = service.list_material_orders(query).await?;
    Ok(Json(orders))
}
