//! Product and material records that orders reconcile against

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_amount, validate_stock_quantity, Material, PriceHistoryEntry, Product};
use uuid::Uuid;
use validator::Validate;

use super::input::required_timestamp;
use crate::error::{AppError, AppResult};
use crate::store::{with_deadline, MaterialFilter, ProductFilter, Store};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
    timeout: Duration,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Product name is required"))]
    pub name: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialInput {
    #[validate(length(min = 1, max = 200, message = "Material name is required"))]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub price_history: Vec<PriceHistoryInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryInput {
    pub price: Decimal,
    pub updated_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MaterialQuery {
    pub name: Option<String>,
}

/// Blank filters match everything
fn non_blank(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        input.validate()?;
        validate_stock_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        validate_amount(input.price).map_err(|msg| AppError::validation("price", msg))?;

        let product = Product {
            id: Uuid::new_v4(),
            sku: input.sku,
            name: input.name,
            material: input.material,
            color: input.color,
            size: input.size,
            quantity: input.quantity,
            price: input.price,
            remark: input.remark,
            created_at: Utc::now(),
        };

        with_deadline(self.timeout, self.store.insert_product(&product)).await?;
        tracing::info!(product_id = %product.id, quantity = product.quantity, "product created");
        Ok(product)
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        with_deadline(self.timeout, self.store.get_product(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))
    }

    pub async fn list_products(&self, query: ProductQuery) -> AppResult<Vec<Product>> {
        let filter = ProductFilter {
            name: non_blank(query.name),
            sku: non_blank(query.sku),
        };
        Ok(with_deadline(self.timeout, self.store.list_products(&filter)).await?)
    }

    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        if !with_deadline(self.timeout, self.store.delete_product(id)).await? {
            return Err(AppError::NotFound(format!("Product {}", id)));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn create_material(&self, input: CreateMaterialInput) -> AppResult<Material> {
        input.validate()?;
        validate_stock_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;

        let price_history = input
            .price_history
            .iter()
            .map(|entry| {
                validate_amount(entry.price)
                    .map_err(|msg| AppError::validation("priceHistory.price", msg))?;
                Ok(PriceHistoryEntry {
                    price: entry.price,
                    updated_at: required_timestamp("priceHistory.updatedAt", &entry.updated_at)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let material = Material {
            id: Uuid::new_v4(),
            name: input.name,
            color: input.color,
            size: input.size,
            quantity: input.quantity,
            remarks: input.remarks,
            price_history,
            created_at: Utc::now(),
        };

        with_deadline(self.timeout, self.store.insert_material(&material)).await?;
        tracing::info!(material_id = %material.id, quantity = material.quantity, "material created");
        Ok(material)
    }

    pub async fn get_material(&self, id: Uuid) -> AppResult<Material> {
        with_deadline(self.timeout, self.store.get_material(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Material {}", id)))
    }

    pub async fn list_materials(&self, query: MaterialQuery) -> AppResult<Vec<Material>> {
        let filter = MaterialFilter {
            name: non_blank(query.name),
        };
        Ok(with_deadline(self.timeout, self.store.list_materials(&filter)).await?)
    }

    pub async fn delete_material(&self, id: Uuid) -> AppResult<()> {
        if !with_deadline(self.timeout, self.store.delete_material(id)).await? {
            return Err(AppError::NotFound(format!("Material {}", id)));
        }
        tracing::info!(material_id = %id, "material deleted");
        Ok(())
    }
}
