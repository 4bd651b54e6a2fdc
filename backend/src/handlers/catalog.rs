//! HTTP handlers for product and material records

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Material, Product};

use crate::error::AppResult;
use crate::services::input::required_id;
use crate::services::catalog::{
    CatalogService, CreateMaterialInput, CreateProductInput, MaterialQuery, ProductQuery,
};
use crate::AppState;

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let service = CatalogService::new(state.store.clone(), state.store_timeout());
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let id = required_id("id", &id)?;
    let service = CatalogService::new(state.store.clone(), state.store_timeout());
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let service = CatalogService::new(state.store.clone(), state.store_timeout());
    let products = service.list_products(query).await?;
    Ok(Json(products))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = required_id("id", &id)?;
    let service = CatalogService::new(state.store.clone(), state.store_timeout());
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_material(
    State(state): State<AppState>,
    Json(input): Json<CreateMaterialInput>,
) -> AppResult<(StatusCode, Json<Material>)> {
    let service = CatalogService::new(state.store.clone(), state.store_timeout());
    let material = service.create_material(input).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Material>> {
    let id = required_id("id", &id)?;
    let service = CatalogService::new(state.store.clone(), state.store_timeout());
    let material = service.get_material(id).await?;
    Ok(Json(material))
}

pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialQuery>,
) -> AppResult<Json<Vec<Material>>> {
    let service = CatalogService::new(state.store.clone(), state.store_timeout());
    let materials = service.list_materials(query).await?;
    Ok(Json(materials))
}

pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = required_id("id", &id)?;
    let service = CatalogService::new(state.store.clone(), state.store_timeout());
    service.delete_material(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
