//! Stock records and the audit trail of quantity adjustments

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finished product held in stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub sku: Option<String>,
    pub name: String,
    pub material: String,
    pub color: String,
    pub size: String,
    /// Authoritative inventory count, never negative
    pub quantity: i64,
    pub price: Decimal,
    pub remark: String,
    pub created_at: DateTime<Utc>,
}

/// A raw material held in stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub size: String,
    /// Authoritative inventory count, never negative
    pub quantity: i64,
    pub remarks: String,
    pub price_history: Vec<PriceHistoryEntry>,
    pub created_at: DateTime<Utc>,
}

/// Purchase price of a material at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    pub price: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Which collection a stock record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockKind {
    Product,
    Material,
}

impl StockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockKind::Product => "product",
            StockKind::Material => "material",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "product" => Some(StockKind::Product),
            "material" => Some(StockKind::Material),
            _ => None,
        }
    }
}

impl std::fmt::Display for StockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single stock record addressed by kind and identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockTarget {
    pub kind: StockKind,
    pub id: Uuid,
}

impl StockTarget {
    pub fn product(id: Uuid) -> Self {
        Self {
            kind: StockKind::Product,
            id,
        }
    }

    pub fn material(id: Uuid) -> Self {
        Self {
            kind: StockKind::Material,
            id,
        }
    }
}

impl std::fmt::Display for StockTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Kind of aggregate that caused a stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Order,
    MaterialOrder,
}

impl AggregateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Order => "order",
            AggregateKind::MaterialOrder => "material_order",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "order" => Some(AggregateKind::Order),
            "material_order" => Some(AggregateKind::MaterialOrder),
            _ => None,
        }
    }
}

impl std::fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stock quantity was adjusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    OrderPlaced,
    OrderItemsAppended,
    OrderCancelled,
    MaterialReceived,
    MaterialReceiptReversed,
}

impl AdjustmentReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentReason::OrderPlaced => "order_placed",
            AdjustmentReason::OrderItemsAppended => "order_items_appended",
            AdjustmentReason::OrderCancelled => "order_cancelled",
            AdjustmentReason::MaterialReceived => "material_received",
            AdjustmentReason::MaterialReceiptReversed => "material_receipt_reversed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "order_placed" => Some(AdjustmentReason::OrderPlaced),
            "order_items_appended" => Some(AdjustmentReason::OrderItemsAppended),
            "order_cancelled" => Some(AdjustmentReason::OrderCancelled),
            "material_received" => Some(AdjustmentReason::MaterialReceived),
            "material_receipt_reversed" => Some(AdjustmentReason::MaterialReceiptReversed),
            _ => None,
        }
    }
}

/// The aggregate transition a ledger operation is performed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentSource {
    pub kind: AggregateKind,
    pub id: Uuid,
    pub reason: AdjustmentReason,
}

/// One applied change to a stock record's quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub id: Uuid,
    pub stock_kind: StockKind,
    pub stock_id: Uuid,
    /// Signed change: negative for decreases
    pub delta: i64,
    pub reason: AdjustmentReason,
    pub source_kind: AggregateKind,
    pub source_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl StockAdjustment {
    pub fn new(target: StockTarget, delta: i64, source: AdjustmentSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            stock_kind: target.kind,
            stock_id: target.id,
            delta,
            reason: source.reason,
            source_kind: source.kind,
            source_id: source.id,
            created_at: Utc::now(),
        }
    }
}
