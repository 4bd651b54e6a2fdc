//! Persistence layer
//!
//! Every aggregate is one document in its own collection. Stock records are
//! independent documents addressed by identifier; the ledger is their
//! `quantity` field plus an append-only table of adjustments.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use shared::{
    AdjustmentSource, Material, MaterialOrder, MaterialOrderChanges, MaterialOrderItem,
    MaterialSnapshot, Order, OrderChanges, OrderItem, OrderStatus, PriceHistoryEntry, Product,
    StockAdjustment, StockKind, StockTarget,
};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt document: {0}")]
    Corrupt(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Run a single store call under a deadline
pub async fn with_deadline<T, F>(timeout: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| StoreError::Timeout(timeout))?
}

/// Result of a conditional write against an aggregate
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<T> {
    Applied(T),
    NotFound,
    /// The status precondition did not hold; carries the status found
    StatusMismatch(OrderStatus),
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct MaterialOrderFilter {
    pub id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// Case-insensitive substring filters over products
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MaterialFilter {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AdjustmentFilter {
    pub stock_kind: Option<StockKind>,
    pub stock_id: Option<Uuid>,
    pub source_id: Option<Uuid>,
}

/// Guarded quantity mutations over single stock records.
///
/// A successful mutation and its audit entry are written together; no
/// atomicity is provided across records.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Decrease by `amount` only if the current quantity is at least `amount`.
    /// Returns whether exactly one record was modified.
    async fn decrease(
        &self,
        target: StockTarget,
        amount: i64,
        source: AdjustmentSource,
    ) -> StoreResult<bool>;

    /// Increase by `amount`. Returns whether exactly one record was modified.
    async fn increase(
        &self,
        target: StockTarget,
        amount: i64,
        source: AdjustmentSource,
    ) -> StoreResult<bool>;

    async fn append_price_history(
        &self,
        material_id: Uuid,
        entry: PriceHistoryEntry,
    ) -> StoreResult<bool>;

    /// Audit entries, newest first
    async fn list_adjustments(&self, filter: &AdjustmentFilter) -> StoreResult<Vec<StockAdjustment>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_product(&self, product: &Product) -> StoreResult<()>;
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>>;
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
    async fn delete_product(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_material(&self, material: &Material) -> StoreResult<()>;
    async fn get_material(&self, id: Uuid) -> StoreResult<Option<Material>>;
    async fn list_materials(&self, filter: &MaterialFilter) -> StoreResult<Vec<Material>>;
    async fn delete_material(&self, id: Uuid) -> StoreResult<bool>;

    /// Overwrite name, color, size and remarks from a received order line.
    /// Returns whether the material exists.
    async fn refresh_material_details(&self, details: &MaterialSnapshot) -> StoreResult<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> StoreResult<()>;
    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>>;
    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>>;

    /// Replace the order's fields, returning the document as it was before
    /// the write. With `expected` set the write only applies while the
    /// current status equals it.
    async fn replace_order(
        &self,
        id: Uuid,
        changes: &OrderChanges,
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<Order>>;

    /// Append items and add their line totals to the order total in one
    /// write, returning the updated document.
    async fn append_order_items(
        &self,
        id: Uuid,
        items: &[OrderItem],
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<Order>>;

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait MaterialOrderStore: Send + Sync {
    async fn insert_material_order(&self, order: &MaterialOrder) -> StoreResult<()>;
    async fn get_material_order(&self, id: Uuid) -> StoreResult<Option<MaterialOrder>>;
    async fn list_material_orders(
        &self,
        filter: &MaterialOrderFilter,
    ) -> StoreResult<Vec<MaterialOrder>>;

    /// Same contract as [`OrderStore::replace_order`]
    async fn replace_material_order(
        &self,
        id: Uuid,
        changes: &MaterialOrderChanges,
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<MaterialOrder>>;

    /// Same contract as [`OrderStore::append_order_items`]
    async fn append_material_order_items(
        &self,
        id: Uuid,
        items: &[MaterialOrderItem],
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<MaterialOrder>>;

    async fn delete_material_order(&self, id: Uuid) -> StoreResult<bool>;
}

/// Everything the services need from persistence
#[async_trait]
pub trait Store: StockLedger + CatalogStore + OrderStore + MaterialOrderStore {
    /// Check that the backing store is reachable
    async fn ping(&self) -> StoreResult<()>;
}

