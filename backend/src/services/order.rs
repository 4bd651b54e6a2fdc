//! Customer order lifecycle coordinator
//!
//! Keeps product stock in step with orders: placing an order or appending
//! items takes stock, cancelling returns it. The order document is always
//! written before the stock it implies.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    customer_order_effect, is_reactivation, line_total, order_items_total, validate_amount,
    validate_declared_total, validate_item_quantity, AdjustmentReason, AggregateKind, Order,
    OrderChanges, OrderItem, OrderProduct, OrderStatus, StockEffect, StockTarget,
};
use uuid::Uuid;
use validator::Validate;

use super::input::{
    optional_id, optional_status, optional_timestamp, required_id, required_status,
    required_timestamp,
};
use super::ledger::StockLedgerService;
use super::reconciliation::{StockDirection, StockPlan};
use crate::error::{AppError, AppResult};
use crate::store::{with_deadline, OrderFilter, Store, WriteOutcome};

/// Order coordinator
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    ledger: StockLedgerService,
    timeout: Duration,
}

/// Line item as submitted by a caller
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product: OrderProductInput,
    pub quantity: i64,
    /// Defaults to unit price times quantity
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProductInput {
    pub id: String,
    pub sku: Option<String>,
    pub name: Option<String>,
    /// Defaults to the product's catalog price
    pub unit_price: Option<Decimal>,
}

/// Input for placing an order
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InsertOrderInput {
    pub customer_id: String,
    #[validate(length(min = 1, max = 200, message = "Customer name is required"))]
    pub customer_name: String,
    pub order_date: String,
    pub delivery_date: Option<String>,
    pub payment_date: Option<String>,
    pub total_amount: Option<Decimal>,
    pub status: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub shipping_address: String,
    #[serde(default)]
    pub order_items: Vec<OrderItemInput>,
}

/// Input for replacing an order's fields
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderInput {
    pub customer_id: String,
    #[validate(length(min = 1, max = 200, message = "Customer name is required"))]
    pub customer_name: String,
    pub order_date: String,
    pub delivery_date: Option<String>,
    pub payment_date: Option<String>,
    pub status: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub shipping_address: String,
    /// Only apply the update while the order is still in this status
    pub expected_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub id: Option<String>,
    pub customer_id: Option<String>,
    pub status: Option<String>,
}

/// Outcome of a status update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTransition {
    pub message: String,
    pub previous_status: OrderStatus,
    pub status: OrderStatus,
    pub stock_effect: StockEffect,
}

/// Outcome of appending items
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendOutcome {
    pub message: String,
    pub order_id: Uuid,
    pub total_amount: Decimal,
}

fn item_plan(
    order_id: Uuid,
    reason: AdjustmentReason,
    direction: StockDirection,
    items: &[OrderItem],
) -> StockPlan {
    items.iter().fold(
        StockPlan::new(AggregateKind::Order, order_id, reason),
        |plan, item| {
            let target = StockTarget::product(item.product.id);
            match direction {
                StockDirection::Increase => plan.increase(target, item.quantity),
                StockDirection::Decrease => plan.decrease(target, item.quantity),
            }
        },
    )
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self {
            ledger: StockLedgerService::new(store.clone(), timeout),
            store,
            timeout,
        }
    }

    /// Validate items and resolve each against the product catalog.
    /// No store writes happen here.
    async fn resolve_items(&self, inputs: &[OrderItemInput]) -> AppResult<Vec<OrderItem>> {
        let mut items = Vec::with_capacity(inputs.len());

        for input in inputs {
            let product_id = required_id("orderItems.product.id", &input.product.id)?;
            validate_item_quantity(input.quantity)
                .map_err(|msg| AppError::validation("orderItems.quantity", msg))?;

            let product = with_deadline(self.timeout, self.store.get_product(product_id))
                .await?
                .ok_or_else(|| {
                    AppError::validation(
                        "orderItems.product.id",
                        format!("Product {} does not exist", product_id),
                    )
                })?;

            let unit_price = input.product.unit_price.unwrap_or(product.price);
            validate_amount(unit_price)
                .map_err(|msg| AppError::validation("orderItems.product.unitPrice", msg))?;
            let total_price = match input.total_price {
                Some(total_price) => total_price,
                None => line_total(unit_price, input.quantity)
                    .map_err(|msg| AppError::validation("orderItems.totalPrice", msg))?,
            };
            validate_amount(total_price)
                .map_err(|msg| AppError::validation("orderItems.totalPrice", msg))?;

            items.push(OrderItem {
                product: OrderProduct {
                    id: product.id,
                    sku: input.product.sku.clone().or(product.sku),
                    name: input.product.name.clone().unwrap_or(product.name),
                    unit_price,
                },
                quantity: input.quantity,
                total_price,
            });
        }

        Ok(items)
    }

    /// Place an order, then take stock for every item
    pub async fn insert_order(&self, input: InsertOrderInput) -> AppResult<Order> {
        input.validate()?;

        let customer_id = required_id("customerId", &input.customer_id)?;
        let order_date = required_timestamp("orderDate", &input.order_date)?;
        let delivery_date = optional_timestamp("deliveryDate", input.delivery_date.as_deref())?;
        let payment_date = optional_timestamp("paymentDate", input.payment_date.as_deref())?;
        let status = required_status("status", &input.status)?;
        let order_items = self.resolve_items(&input.order_items).await?;

        let total_amount = order_items_total(&order_items)
            .ok_or_else(|| AppError::validation("totalAmount", "Order total is out of range"))?;
        validate_declared_total(input.total_amount, total_amount)
            .map_err(|msg| AppError::validation("totalAmount", msg))?;

        let order = Order {
            id: Uuid::new_v4(),
            customer_id,
            customer_name: input.customer_name,
            order_date,
            delivery_date,
            payment_date,
            total_amount,
            status,
            shipping_address: input.shipping_address,
            order_items,
        };

        with_deadline(self.timeout, self.store.insert_order(&order)).await?;
        tracing::info!(
            order_id = %order.id,
            status = %order.status,
            items = order.order_items.len(),
            "order inserted"
        );

        if !status.is_cancelled() {
            let plan = item_plan(
                order.id,
                AdjustmentReason::OrderPlaced,
                StockDirection::Decrease,
                &order.order_items,
            );
            self.ledger.execute(plan).await?;
        }

        Ok(order)
    }

    /// Replace an order's fields and return stock if it was just cancelled
    pub async fn update_order(&self, id: Uuid, input: UpdateOrderInput) -> AppResult<OrderTransition> {
        input.validate()?;

        let changes = OrderChanges {
            customer_id: required_id("customerId", &input.customer_id)?,
            customer_name: input.customer_name,
            order_date: required_timestamp("orderDate", &input.order_date)?,
            delivery_date: optional_timestamp("deliveryDate", input.delivery_date.as_deref())?,
            payment_date: optional_timestamp("paymentDate", input.payment_date.as_deref())?,
            status: required_status("status", &input.status)?,
            shipping_address: input.shipping_address,
        };
        let expected = optional_status("expectedStatus", input.expected_status.as_deref())?;

        let previous = match with_deadline(
            self.timeout,
            self.store.replace_order(id, &changes, expected),
        )
        .await?
        {
            WriteOutcome::Applied(previous) => previous,
            WriteOutcome::NotFound => return Err(AppError::NotFound(format!("Order {}", id))),
            WriteOutcome::StatusMismatch(actual) => {
                return Err(AppError::StatusConflict {
                    expected: expected.unwrap_or(actual),
                    actual,
                    report: None,
                })
            }
        };

        let effect = customer_order_effect(previous.status, changes.status);
        tracing::info!(
            order_id = %id,
            previous = %previous.status,
            next = %changes.status,
            effect = effect.as_str(),
            "order status transition"
        );
        if is_reactivation(previous.status, changes.status) {
            tracing::warn!(order_id = %id, next = %changes.status, "cancelled order reactivated, stock is not withdrawn again");
        }

        if effect == StockEffect::Restock {
            let plan = item_plan(
                id,
                AdjustmentReason::OrderCancelled,
                StockDirection::Increase,
                &previous.order_items,
            );
            self.ledger.execute(plan).await?;
        }

        Ok(OrderTransition {
            message: format!("Order {} updated", id),
            previous_status: previous.status,
            status: changes.status,
            stock_effect: effect,
        })
    }

    /// Append items to a live order, then take stock for each new item
    pub async fn append_items(&self, id: Uuid, inputs: Vec<OrderItemInput>) -> AppResult<AppendOutcome> {
        if inputs.is_empty() {
            return Err(AppError::validation("orderItems", "At least one item is required"));
        }

        let current = with_deadline(self.timeout, self.store.get_order(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {}", id)))?;
        if current.status.is_cancelled() {
            return Err(AppError::OrderCancelled(id));
        }

        let items = self.resolve_items(&inputs).await?;
        order_items_total(&items)
            .and_then(|appended| current.total_amount.checked_add(appended))
            .ok_or_else(|| AppError::validation("totalAmount", "Order total is out of range"))?;

        let updated = match with_deadline(
            self.timeout,
            self.store.append_order_items(id, &items, Some(current.status)),
        )
        .await?
        {
            WriteOutcome::Applied(updated) => updated,
            WriteOutcome::NotFound => return Err(AppError::NotFound(format!("Order {}", id))),
            WriteOutcome::StatusMismatch(actual) if actual.is_cancelled() => {
                return Err(AppError::OrderCancelled(id))
            }
            WriteOutcome::StatusMismatch(actual) => {
                return Err(AppError::StatusConflict {
                    expected: current.status,
                    actual,
                    report: None,
                })
            }
        };
        tracing::info!(
            order_id = %id,
            appended = items.len(),
            total = %updated.total_amount,
            "order items appended"
        );

        let plan = item_plan(
            id,
            AdjustmentReason::OrderItemsAppended,
            StockDirection::Decrease,
            &items,
        );
        self.ledger.execute(plan).await?;

        Ok(AppendOutcome {
            message: format!("{} item(s) added to order {}", items.len(), id),
            order_id: id,
            total_amount: updated.total_amount,
        })
    }

    /// Remove the document only; stock is left as it is
    pub async fn delete_order(&self, id: Uuid) -> AppResult<()> {
        let deleted = with_deadline(self.timeout, self.store.delete_order(id)).await?;
        if !deleted {
            return Err(AppError::NotFound(format!("Order {}", id)));
        }
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    pub async fn get_order(&self, id: Uuid) -> AppResult<Order> {
        with_deadline(self.timeout, self.store.get_order(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {}", id)))
    }

    pub async fn list_orders(&self, query: OrderQuery) -> AppResult<Vec<Order>> {
        let filter = OrderFilter {
            id: optional_id("id", query.id.as_deref())?,
            customer_id: optional_id("customerId", query.customer_id.as_deref())?,
            status: optional_status("status", query.status.as_deref())?,
        };
        Ok(with_deadline(self.timeout, self.store.list_orders(&filter)).await?)
    }
}
