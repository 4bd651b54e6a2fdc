//! PostgreSQL store
//!
//! Line items and price history are embedded JSONB documents on their parent
//! row. A guarded decrease is a single conditional `UPDATE`, and each quantity
//! change shares a transaction with its audit row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    AdjustmentReason, AdjustmentSource, AggregateKind, Material, MaterialOrder,
    MaterialOrderChanges, MaterialOrderItem, MaterialSnapshot, Order, OrderChanges, OrderItem,
    OrderStatus, PriceHistoryEntry, Product, StockAdjustment, StockKind, StockTarget,
};
use sqlx::{types::Json, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    AdjustmentFilter, CatalogStore, MaterialFilter, MaterialOrderFilter, MaterialOrderStore,
    OrderFilter, OrderStore, ProductFilter, StockLedger, Store, StoreError, StoreResult,
    WriteOutcome,
};

const PRODUCT_COLUMNS: &str =
    "id, sku, name, material, color, size, quantity, price, remark, created_at";
const MATERIAL_COLUMNS: &str =
    "id, name, color, size, quantity, remarks, price_history, created_at";
const ORDER_COLUMNS: &str = "id, customer_id, customer_name, order_date, delivery_date, \
     payment_date, total_amount, status, shipping_address, order_items";
const MATERIAL_ORDER_COLUMNS: &str = "id, seller_id, seller_name, order_date, delivery_date, \
     payment_date, total_amount, status, material_order_items";
const ADJUSTMENT_COLUMNS: &str =
    "id, stock_kind, stock_id, delta, reason, source_kind, source_id, created_at";

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply a signed quantity change and record it, in one transaction
    async fn adjust(
        &self,
        target: StockTarget,
        delta: i64,
        source: AdjustmentSource,
    ) -> StoreResult<bool> {
        let table = stock_table(target.kind);
        // Decreases only apply while the result stays non-negative
        let sql = if delta < 0 {
            format!("UPDATE {table} SET quantity = quantity + $2 WHERE id = $1 AND quantity + $2 >= 0")
        } else {
            format!("UPDATE {table} SET quantity = quantity + $2 WHERE id = $1")
        };

        let mut tx = self.db.begin().await?;

        let result = sqlx::query(&sql)
            .bind(target.id)
            .bind(delta)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        let adjustment = StockAdjustment::new(target, delta, source);
        sqlx::query(
            r#"
            INSERT INTO stock_adjustments (id, stock_kind, stock_id, delta, reason, source_kind, source_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(adjustment.id)
        .bind(adjustment.stock_kind.as_str())
        .bind(adjustment.stock_id)
        .bind(adjustment.delta)
        .bind(adjustment.reason.as_str())
        .bind(adjustment.source_kind.as_str())
        .bind(adjustment.source_id)
        .bind(adjustment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }
}

fn stock_table(kind: StockKind) -> &'static str {
    match kind {
        StockKind::Product => "products",
        StockKind::Material => "materials",
    }
}

fn parse_status(raw: &str) -> StoreResult<OrderStatus> {
    OrderStatus::parse(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
}

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    sku: Option<String>,
    name: String,
    material: String,
    color: String,
    size: String,
    quantity: i64,
    price: Decimal,
    remark: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            material: row.material,
            color: row.color,
            size: row.size,
            quantity: row.quantity,
            price: row.price,
            remark: row.remark,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MaterialRow {
    id: Uuid,
    name: String,
    color: String,
    size: String,
    quantity: i64,
    remarks: String,
    price_history: Json<Vec<PriceHistoryEntry>>,
    created_at: DateTime<Utc>,
}

impl From<MaterialRow> for Material {
    fn from(row: MaterialRow) -> Self {
        Material {
            id: row.id,
            name: row.name,
            color: row.color,
            size: row.size,
            quantity: row.quantity,
            remarks: row.remarks,
            price_history: row.price_history.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    customer_name: String,
    order_date: DateTime<Utc>,
    delivery_date: Option<DateTime<Utc>>,
    payment_date: Option<DateTime<Utc>>,
    total_amount: Decimal,
    status: String,
    shipping_address: String,
    order_items: Json<Vec<OrderItem>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            order_date: row.order_date,
            delivery_date: row.delivery_date,
            payment_date: row.payment_date,
            total_amount: row.total_amount,
            status: parse_status(&row.status)?,
            shipping_address: row.shipping_address,
            order_items: row.order_items.0,
        })
    }
}

#[derive(Debug, FromRow)]
struct MaterialOrderRow {
    id: Uuid,
    seller_id: Uuid,
    seller_name: String,
    order_date: DateTime<Utc>,
    delivery_date: Option<DateTime<Utc>>,
    payment_date: Option<DateTime<Utc>>,
    total_amount: Decimal,
    status: String,
    material_order_items: Json<Vec<MaterialOrderItem>>,
}

impl TryFrom<MaterialOrderRow> for MaterialOrder {
    type Error = StoreError;

    fn try_from(row: MaterialOrderRow) -> Result<Self, Self::Error> {
        Ok(MaterialOrder {
            id: row.id,
            seller_id: row.seller_id,
            seller_name: row.seller_name,
            order_date: row.order_date,
            delivery_date: row.delivery_date,
            payment_date: row.payment_date,
            total_amount: row.total_amount,
            status: parse_status(&row.status)?,
            material_order_items: row.material_order_items.0,
        })
    }
}

#[derive(Debug, FromRow)]
struct AdjustmentRow {
    id: Uuid,
    stock_kind: String,
    stock_id: Uuid,
    delta: i64,
    reason: String,
    source_kind: String,
    source_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdjustmentRow> for StockAdjustment {
    type Error = StoreError;

    fn try_from(row: AdjustmentRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, value: &str| {
            StoreError::Corrupt(format!("stock adjustment {} has unknown {} {:?}", row.id, field, value))
        };
        Ok(StockAdjustment {
            id: row.id,
            stock_kind: StockKind::parse(&row.stock_kind)
                .ok_or_else(|| corrupt("stock kind", &row.stock_kind))?,
            stock_id: row.stock_id,
            delta: row.delta,
            reason: AdjustmentReason::parse(&row.reason)
                .ok_or_else(|| corrupt("reason", &row.reason))?,
            source_kind: AggregateKind::parse(&row.source_kind)
                .ok_or_else(|| corrupt("source kind", &row.source_kind))?,
            source_id: row.source_id,
            created_at: row.created_at,
        })
    }
}

// ============================================================================
// Stock ledger
// ============================================================================

#[async_trait]
impl StockLedger for PgStore {
    async fn decrease(
        &self,
        target: StockTarget,
        amount: i64,
        source: AdjustmentSource,
    ) -> StoreResult<bool> {
        self.adjust(target, -amount, source).await
    }

    async fn increase(
        &self,
        target: StockTarget,
        amount: i64,
        source: AdjustmentSource,
    ) -> StoreResult<bool> {
        self.adjust(target, amount, source).await
    }

    async fn append_price_history(
        &self,
        material_id: Uuid,
        entry: PriceHistoryEntry,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE materials SET price_history = price_history || $2::jsonb WHERE id = $1",
        )
        .bind(material_id)
        .bind(Json(vec![entry]))
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_adjustments(&self, filter: &AdjustmentFilter) -> StoreResult<Vec<StockAdjustment>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM stock_adjustments WHERE TRUE"
        ));
        if let Some(kind) = filter.stock_kind {
            query.push(" AND stock_kind = ").push_bind(kind.as_str());
        }
        if let Some(stock_id) = filter.stock_id {
            query.push(" AND stock_id = ").push_bind(stock_id);
        }
        if let Some(source_id) = filter.source_id {
            query.push(" AND source_id = ").push_bind(source_id);
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<AdjustmentRow>()
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(StockAdjustment::try_from).collect()
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, material, color, size, quantity, price, remark, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.material)
        .bind(&product.color)
        .bind(&product.size)
        .bind(product.quantity)
        .bind(product.price)
        .bind(&product.remark)
        .bind(product.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));
        if let Some(name) = &filter.name {
            query.push(" AND name ILIKE ").push_bind(format!("%{}%", name));
        }
        if let Some(sku) = &filter.sku {
            query.push(" AND sku ILIKE ").push_bind(format!("%{}%", sku));
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<ProductRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_material(&self, material: &Material) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO materials (id, name, color, size, quantity, remarks, price_history, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(material.id)
        .bind(&material.name)
        .bind(&material.color)
        .bind(&material.size)
        .bind(material.quantity)
        .bind(&material.remarks)
        .bind(Json(&material.price_history))
        .bind(material.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn get_material(&self, id: Uuid) -> StoreResult<Option<Material>> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Material::from))
    }

    async fn list_materials(&self, filter: &MaterialFilter) -> StoreResult<Vec<Material>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {MATERIAL_COLUMNS} FROM materials WHERE TRUE"));
        if let Some(name) = &filter.name {
            query.push(" AND name ILIKE ").push_bind(format!("%{}%", name));
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<MaterialRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Material::from).collect())
    }

    async fn delete_material(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn refresh_material_details(&self, details: &MaterialSnapshot) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE materials SET name = $2, color = $3, size = $4, remarks = $5 WHERE id = $1",
        )
        .bind(details.id)
        .bind(&details.name)
        .bind(&details.color)
        .bind(&details.size)
        .bind(&details.remarks)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Customer orders
// ============================================================================

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, customer_name, order_date, delivery_date, payment_date,
                                total_amount, status, shipping_address, order_items)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id)
        .bind(order.customer_id)
        .bind(&order.customer_name)
        .bind(order.order_date)
        .bind(order.delivery_date)
        .bind(order.payment_date)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(&order.shipping_address)
        .bind(Json(&order.order_items))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE TRUE"));
        if let Some(id) = filter.id {
            query.push(" AND id = ").push_bind(id);
        }
        if let Some(customer_id) = filter.customer_id {
            query.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        query.push(" ORDER BY order_date DESC");

        let rows = query
            .build_query_as::<OrderRow>()
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn replace_order(
        &self,
        id: Uuid,
        changes: &OrderChanges,
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<Order>> {
        let mut tx = self.db.begin().await?;

        // Lock the row so the returned previous status is the one replaced
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(WriteOutcome::NotFound);
        };
        let previous = Order::try_from(row)?;

        if let Some(expected) = expected {
            if previous.status != expected {
                return Ok(WriteOutcome::StatusMismatch(previous.status));
            }
        }

        sqlx::query(
            r#"
            UPDATE orders
            SET customer_id = $2, customer_name = $3, order_date = $4, delivery_date = $5,
                payment_date = $6, status = $7, shipping_address = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.customer_id)
        .bind(&changes.customer_name)
        .bind(changes.order_date)
        .bind(changes.delivery_date)
        .bind(changes.payment_date)
        .bind(changes.status.as_str())
        .bind(&changes.shipping_address)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(WriteOutcome::Applied(previous))
    }

    async fn append_order_items(
        &self,
        id: Uuid,
        items: &[OrderItem],
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<Order>> {
        let appended = shared::order_items_total(items)
            .ok_or_else(|| StoreError::OutOfRange(format!("total of order {}", id)))?;
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, String>("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(current) = current else {
            return Ok(WriteOutcome::NotFound);
        };
        let current = parse_status(&current)?;

        if let Some(expected) = expected {
            if current != expected {
                return Ok(WriteOutcome::StatusMismatch(current));
            }
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders
            SET order_items = order_items || $2::jsonb, total_amount = total_amount + $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(Json(items))
        .bind(appended)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(WriteOutcome::Applied(Order::try_from(row)?))
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Material orders
// ============================================================================

#[async_trait]
impl MaterialOrderStore for PgStore {
    async fn insert_material_order(&self, order: &MaterialOrder) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO material_orders (id, seller_id, seller_name, order_date, delivery_date,
                                         payment_date, total_amount, status, material_order_items)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id)
        .bind(order.seller_id)
        .bind(&order.seller_name)
        .bind(order.order_date)
        .bind(order.delivery_date)
        .bind(order.payment_date)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(Json(&order.material_order_items))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn get_material_order(&self, id: Uuid) -> StoreResult<Option<MaterialOrder>> {
        let row = sqlx::query_as::<_, MaterialOrderRow>(&format!(
            "SELECT {MATERIAL_ORDER_COLUMNS} FROM material_orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(MaterialOrder::try_from).transpose()
    }

    async fn list_material_orders(
        &self,
        filter: &MaterialOrderFilter,
    ) -> StoreResult<Vec<MaterialOrder>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {MATERIAL_ORDER_COLUMNS} FROM material_orders WHERE TRUE"
        ));
        if let Some(id) = filter.id {
            query.push(" AND id = ").push_bind(id);
        }
        if let Some(seller_id) = filter.seller_id {
            query.push(" AND seller_id = ").push_bind(seller_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        query.push(" ORDER BY order_date DESC");

        let rows = query
            .build_query_as::<MaterialOrderRow>()
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(MaterialOrder::try_from).collect()
    }

    async fn replace_material_order(
        &self,
        id: Uuid,
        changes: &MaterialOrderChanges,
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<MaterialOrder>> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, MaterialOrderRow>(&format!(
            "SELECT {MATERIAL_ORDER_COLUMNS} FROM material_orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(WriteOutcome::NotFound);
        };
        let previous = MaterialOrder::try_from(row)?;

        if let Some(expected) = expected {
            if previous.status != expected {
                return Ok(WriteOutcome::StatusMismatch(previous.status));
            }
        }

        sqlx::query(
            r#"
            UPDATE material_orders
            SET seller_id = $2, seller_name = $3, order_date = $4, delivery_date = $5,
                payment_date = $6, status = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.seller_id)
        .bind(&changes.seller_name)
        .bind(changes.order_date)
        .bind(changes.delivery_date)
        .bind(changes.payment_date)
        .bind(changes.status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(WriteOutcome::Applied(previous))
    }

    async fn append_material_order_items(
        &self,
        id: Uuid,
        items: &[MaterialOrderItem],
        expected: Option<OrderStatus>,
    ) -> StoreResult<WriteOutcome<MaterialOrder>> {
        let appended = shared::material_items_total(items)
            .ok_or_else(|| StoreError::OutOfRange(format!("total of material order {}", id)))?;
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM material_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(WriteOutcome::NotFound);
        };
        let current = parse_status(&current)?;

        if let Some(expected) = expected {
            if current != expected {
                return Ok(WriteOutcome::StatusMismatch(current));
            }
        }

        let row = sqlx::query_as::<_, MaterialOrderRow>(&format!(
            r#"
            UPDATE material_orders
            SET material_order_items = material_order_items || $2::jsonb,
                total_amount = total_amount + $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {MATERIAL_ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(Json(items))
        .bind(appended)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(WriteOutcome::Applied(MaterialOrder::try_from(row)?))
    }

    async fn delete_material_order(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM material_orders WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    const SCHEMA: &str = include_str!("../../migrations/20240301000001_initial_schema.sql");

    #[test]
    fn amount_columns_store_decimals_exactly() {
        assert!(!SCHEMA.contains("NUMERIC("));
        assert_eq!(SCHEMA.matches("NUMERIC NOT NULL").count(), 3);
    }
}
