//! Supplier-side material order aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrderStatus;
use crate::validation::checked_sum;

/// A purchase of raw materials from a seller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOrder {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub order_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub material_order_items: Vec<MaterialOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOrderItem {
    pub material: MaterialSnapshot,
    pub quantity: i64,
    pub total_price: Decimal,
}

/// Material attributes as recorded when the order was placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSnapshot {
    pub id: Uuid,
    pub name: String,
    /// Unit price paid to the seller
    pub price: Decimal,
    pub color: String,
    pub size: String,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialOrderChanges {
    pub seller_id: Uuid,
    pub seller_name: String,
    pub order_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
}

impl MaterialOrder {
    pub fn apply(&mut self, changes: &MaterialOrderChanges) {
        self.seller_id = changes.seller_id;
        self.seller_name = changes.seller_name.clone();
        self.order_date = changes.order_date;
        self.delivery_date = changes.delivery_date;
        self.payment_date = changes.payment_date;
        self.status = changes.status;
    }
}

/// Sum of line totals, `None` if it does not fit in a `Decimal`
pub fn material_items_total(items: &[MaterialOrderItem]) -> Option<Decimal> {
    checked_sum(items.iter().map(|item| item.total_price))
}
