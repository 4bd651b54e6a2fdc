//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ims_backend::{store::InMemoryStore, AppState, Config};
use rust_decimal::Decimal;
use shared::{Material, Product, StockTarget};
use uuid::Uuid;

use ims_backend::store::CatalogStore;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn dec(raw: &str) -> Decimal {
    raw.parse().unwrap()
}

pub async fn seed_product(store: &InMemoryStore, quantity: i64, price: &str) -> Uuid {
    let product = Product {
        id: Uuid::new_v4(),
        sku: Some(format!("SKU-{}", quantity)),
        name: "Canvas tote".to_string(),
        material: "canvas".to_string(),
        color: "natural".to_string(),
        size: "M".to_string(),
        quantity,
        price: dec(price),
        remark: String::new(),
        created_at: Utc::now(),
    };
    store.insert_product(&product).await.unwrap();
    product.id
}

pub async fn seed_material(store: &InMemoryStore, quantity: i64) -> Uuid {
    let material = Material {
        id: Uuid::new_v4(),
        name: "Cotton canvas".to_string(),
        color: "natural".to_string(),
        size: "150cm".to_string(),
        quantity,
        remarks: String::new(),
        price_history: Vec::new(),
        created_at: Utc::now(),
    };
    store.insert_material(&material).await.unwrap();
    material.id
}

pub async fn product_quantity(store: &InMemoryStore, id: Uuid) -> i64 {
    store.quantity(StockTarget::product(id)).await.unwrap()
}

pub async fn material_quantity(store: &InMemoryStore, id: Uuid) -> i64 {
    store.quantity(StockTarget::material(id)).await.unwrap()
}

pub fn app_state(store: &InMemoryStore) -> AppState {
    AppState::new(Arc::new(store.clone()), Config::in_memory())
}
