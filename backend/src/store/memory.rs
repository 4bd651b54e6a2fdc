//! In-memory store used by tests and by `store.backend = "memory"`

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    AdjustmentSource, Material, MaterialOrder, MaterialOrderChanges, MaterialOrderItem,
    MaterialSnapshot, Order, OrderChanges, OrderItem, OrderStatus, PriceHistoryEntry, Product,
    StockAdjustment, StockKind, StockTarget,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AdjustmentFilter, CatalogStore, MaterialFilter, MaterialOrderFilter, MaterialOrderStore,
    OrderFilter, OrderStore, ProductFilter, StockLedger, Store, StoreError, StoreResult,
    WriteOutcome,
};

#[derive(Debug, Default)]
struct MemoryState {
    products: HashMap<Uuid, Product>,
    materials: HashMap<Uuid, Material>,
    orders: HashMap<Uuid, Order>,
    material_orders: HashMap<Uuid, MaterialOrder>,
    adjustments: Vec<StockAdjustment>,
}

impl MemoryState {
    fn quantity_mut(&mut self, target: StockTarget) -> Option<&mut i64> {
        match target.kind {
            StockKind::Product => self.products.get_mut(&target.id).map(|p| &mut p.quantity),
            StockKind::Material => self.materials.get_mut(&target.id).map(|m| &mut m.quantity),
        }
    }
}

/// Store holding every collection behind one lock, so each call is atomic
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current quantity of a stock record, if it exists
    pub async fn quantity(&self, target: StockTarget) -> Option<i64> {
        let state = self.state.read().await;
        match target.kind {
            StockKind::Product => state.products.get(&target.id).map(|p| p.quantity),
            StockKind::Material => state.materials.get(&target.id).map(|m| m.quantity),
        }
    }

    pub async fn adjustment_count(&self) -> usize {
        self.state.read().await.adjustments.len()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn sort_newest_first<T>(items: &mut [T], date: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    items.sort_by(|a, b| date(b).cmp(&date(a)));
}

#[async_trait]
impl StockLedger for InMemoryStore {
    async fn decrease(
        &self,
        target: StockTarget,
        amount: i64,
        source: AdjustmentSource,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.quantity_mut(target) {
            Some(quantity) if *quantity >= amount => *quantity -= amount,
            _ => return Ok(false),
        }
        state
            .adjustments
            .push(StockAdjustment::new(target, -amount, source));
        Ok(true)
    }

    async fn increase(
        &self,
        target: StockTarget,
        amount: i64,
        source: AdjustmentSource,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.quantity_mut(target) {
            Some(quantity) => {
                *quantity = quantity.checked_add(amount).ok_or_else(|| {
                    StoreError::OutOfRange(format!("{} cannot grow by {}", target, amount))
                })?
            }
            None => return Ok(false),
        }
        state
            .adjustments
            .push(StockAdjustment::new(target, amount, source));
        Ok(true)
    }

    async fn append_price_history(
        &self,
        material_id: Uuid,
        entry: PriceHistoryEntry,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.materials.get_mut(&material_id) {
            Some(material) => {
                material.price_history.push(entry);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_adjustments(&self, filter: &AdjustmentFilter) -> StoreResult<Vec<StockAdjustment>> {
        let state = self.state.read().await;
        let mut adjustments: Vec<_> = state
            .adjustments
            .iter()
            .filter(|a| filter.stock_kind.map_or(true, |k| a.stock_kind == k))
            .filter(|a| filter.stock_id.map_or(true, |id| a.stock_id == id))
            .filter(|a| filter.source_id.map_or(true, |id| a.source_id == id))
            .cloned()
            .collect();
        // Entries are appended in order, so reversing keeps ties stable
        adjustments.reverse();
        Ok(adjustments)
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        self.state
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| {
                filter
                    .name
                    .as_deref()
                    .map_or(true, |name| contains_ignore_case(&p.name, name))
            })
            .filter(|p| {
                filter.sku.as_deref().map_or(true, |sku| {
                    p.sku
                        .as_deref()
                        .is_some_and(|own| contains_ignore_case(own, sku))
                })
            })
            .cloned()
            .collect();
        sort_newest_first(&mut products, |p| p.created_at);
        Ok(products)
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().await.products.remove(&id).is_some())
    }

    async fn insert_material(&self, material: &Material) -> StoreResult<()> {
        self.state
            .write()
            .await
            .materials
            .insert(material.id, material.clone());
        Ok(())
    }

    async fn get_material(&self, id: Uuid) -> StoreResult<Option<Material>> {
        Ok(self.state.read().await.materials.get(&id).cloned())
    }

    async fn list_materials(&self, filter: &MaterialFilter) -> StoreResult<Vec<Material>> {
        let state = self.state.read().await;
        let mut materials: Vec<_> = state
            .materials
            .values()
            .filter(|m| {
                filter
                    .name
                    .as_deref()
                    .map_or(true, |name| contains_ignore_case(&m.name, name))
            })
            .cloned()
            .collect();
        sort_newest_first(&mut materials, |m| m.created_at);
        Ok(materials)
    }

    async fn delete_material(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().await.materials.remove(&id).is_some())
    }

    async fn refresh_material_details(&self, details: &MaterialSnapshot) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let Some(material) = state.materials.get_mut(&details.id) else {
            return Ok(false);
        };
        material.name = details.name.clone();
        material.color = details.color.clone();
        material.size = details.size.clone();
        material.remarks = details.remarks.clone();
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        self.state
            .write()
            .await
            .orders
            .insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| filter.id.map_or(true, |id| o.id == id))
            .filter(|o| filter.customer_id.map_or(true, |id| o.customer_id == id))
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        sort_newest_first(&mut orders, |o| o.order_date);
        Ok(orders)
    }

    async fn replace_order(
        &self,
        id: Uuid,
        changes: &OrderChanges,
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<Order>> {
        let mut state = self.state.write().await;
        let Some(order) = state.orders.get_mut(&id) else {
            return Ok(WriteOutcome::NotFound);
        };
        if let Some(expected) = expected {
            if order.status != expected {
                return Ok(WriteOutcome::StatusMismatch(order.status));
            }
        }
        let previous = order.clone();
        order.apply(changes);
        Ok(WriteOutcome::Applied(previous))
    }

    async fn append_order_items(
        &self,
        id: Uuid,
        items: &[OrderItem],
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<Order>> {
        let mut state = self.state.write().await;
        let Some(order) = state.orders.get_mut(&id) else {
            return Ok(WriteOutcome::NotFound);
        };
        if let Some(expected) = expected {
            if order.status != expected {
                return Ok(WriteOutcome::StatusMismatch(order.status));
            }
        }
        order.total_amount = shared::order_items_total(items)
            .and_then(|appended| order.total_amount.checked_add(appended))
            .ok_or_else(|| StoreError::OutOfRange(format!("total of order {}", id)))?;
        order.order_items.extend_from_slice(items);
        Ok(WriteOutcome::Applied(order.clone()))
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().await.orders.remove(&id).is_some())
    }
}

#[async_trait]
impl MaterialOrderStore for InMemoryStore {
    async fn insert_material_order(&self, order: &MaterialOrder) -> StoreResult<()> {
        self.state
            .write()
            .await
            .material_orders
            .insert(order.id, order.clone());
        Ok(())
    }

    async fn get_material_order(&self, id: Uuid) -> StoreResult<Option<MaterialOrder>> {
        Ok(self.state.read().await.material_orders.get(&id).cloned())
    }

    async fn list_material_orders(
        &self,
        filter: &MaterialOrderFilter,
    ) -> StoreResult<Vec<MaterialOrder>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .material_orders
            .values()
            .filter(|o| filter.id.map_or(true, |id| o.id == id))
            .filter(|o| filter.seller_id.map_or(true, |id| o.seller_id == id))
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        sort_newest_first(&mut orders, |o| o.order_date);
        Ok(orders)
    }

    async fn replace_material_order(
        &self,
        id: Uuid,
        changes: &MaterialOrderChanges,
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<MaterialOrder>> {
        let mut state = self.state.write().await;
        let Some(order) = state.material_orders.get_mut(&id) else {
            return Ok(WriteOutcome::NotFound);
        };
        if let Some(expected) = expected {
            if order.status != expected {
                return Ok(WriteOutcome::StatusMismatch(order.status));
            }
        }
        let previous = order.clone();
        order.apply(changes);
        Ok(WriteOutcome::Applied(previous))
    }

    async fn append_material_order_items(
        &self,
        id: Uuid,
        items: &[MaterialOrderItem],
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<MaterialOrder>> {
        let mut state = self.state.write().await;
        let Some(order) = state.material_orders.get_mut(&id) else {
            return Ok(WriteOutcome::NotFound);
        };
        if let Some(expected) = expected {
            if order.status != expected {
                return Ok(WriteOutcome::StatusMismatch(order.status));
            }
        }
        order.total_amount = shared::material_items_total(items)
            .and_then(|appended| order.total_amount.checked_add(appended))
            .ok_or_else(|| StoreError::OutOfRange(format!("total of material order {}", id)))?;
        order.material_order_items.extend_from_slice(items);
        Ok(WriteOutcome::Applied(order.clone()))
    }

    async fn delete_material_order(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.state.write().await.material_orders.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
