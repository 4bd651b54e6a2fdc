//! Customer order aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrderStatus;
use crate::validation::checked_sum;

/// A customer order with its embedded line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub order_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    /// Sum of all line totals
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub order_items: Vec<OrderItem>,
}

/// A product line within a customer order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: OrderProduct,
    pub quantity: i64,
    pub total_price: Decimal,
}

/// Snapshot of the ordered product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    pub id: Uuid,
    pub sku: Option<String>,
    pub name: String,
    pub unit_price: Decimal,
}

/// Replaceable fields of a customer order.
/// Items and the total are maintained by insert and append only.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderChanges {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub order_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub shipping_address: String,
}

impl Order {
    pub fn apply(&mut self, changes: &OrderChanges) {
        self.customer_id = changes.customer_id;
        self.customer_name = changes.customer_name.clone();
        self.order_date = changes.order_date;
        self.delivery_date = changes.delivery_date;
        self.payment_date = changes.payment_date;
        self.status = changes.status;
        self.shipping_address = changes.shipping_address.clone();
    }
}

/// Sum of line totals, `None` if it does not fit in a `Decimal`
pub fn order_items_total(items: &[OrderItem]) -> Option<Decimal> {
    checked_sum(items.iter().map(|item| item.total_price))
}
