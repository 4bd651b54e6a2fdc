//! Material order lifecycle coordinator
//!
//! Mirror image of customer orders: a fulfilled material order adds its
//! items to material stock, and cancelling it afterwards takes them back.
//! Receipts are applied before the order document changes; reversals after.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    line_total, material_items_total, material_order_effect, validate_amount,
    validate_declared_total, validate_item_quantity, AdjustmentReason, AggregateKind,
    MaterialOrder, MaterialOrderChanges, MaterialOrderItem, MaterialSnapshot, OrderStatus,
    PriceHistoryEntry, StockEffect, StockTarget,
};
use uuid::Uuid;
use validator::Validate;

use super::input::{
    optional_id, optional_status, optional_timestamp, required_id, required_status,
    required_timestamp,
};
use super::ledger::StockLedgerService;
use super::reconciliation::{ReconciliationReport, StockPlan};
use crate::error::{AppError, AppResult};
use crate::store::{with_deadline, MaterialOrderFilter, Store, WriteOutcome};

#[derive(Clone)]
pub struct MaterialOrderService {
    store: Arc<dyn Store>,
    ledger: StockLedgerService,
    timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOrderItemInput {
    pub material: MaterialSnapshotInput,
    pub quantity: i64,
    /// Defaults to price times quantity
    pub total_price: Option<Decimal>,
}

/// Material attributes as the seller quoted them; blanks fall back to the
/// catalog record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSnapshotInput {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InsertMaterialOrderInput {
    pub seller_id: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub seller_name: String,
    pub order_date: String,
    pub delivery_date: Option<String>,
    pub payment_date: Option<String>,
    pub total_amount: Option<Decimal>,
    pub status: String,
    #[serde(default)]
    pub material_order_items: Vec<MaterialOrderItemInput>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialOrderInput {
    pub seller_id: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub seller_name: String,
    pub order_date: String,
    pub delivery_date: Option<String>,
    pub payment_date: Option<String>,
    pub status: String,
    pub expected_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOrderQuery {
    pub id: Option<String>,
    pub seller_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOrderTransition {
    pub message: String,
    pub previous_status: OrderStatus,
    pub status: OrderStatus,
    pub stock_effect: StockEffect,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialAppendOutcome {
    pub message: String,
    pub material_order_id: Uuid,
    pub total_amount: Decimal,
    /// Whether the new items were added to stock straight away
    pub received: bool,
}

/// Increase each material and record the price paid, dated at `received_at`
fn receipt_plan(
    order_id: Uuid,
    received_at: DateTime<Utc>,
    items: &[MaterialOrderItem],
) -> StockPlan {
    items.iter().fold(
        StockPlan::new(
            AggregateKind::MaterialOrder,
            order_id,
            AdjustmentReason::MaterialReceived,
        ),
        |plan, item| {
            plan.receive(
                StockTarget::material(item.material.id),
                item.quantity,
                PriceHistoryEntry {
                    price: item.material.price,
                    updated_at: received_at,
                },
            )
        },
    )
}

fn reversal_plan(order_id: Uuid, items: &[MaterialOrderItem]) -> StockPlan {
    items.iter().fold(
        StockPlan::new(
            AggregateKind::MaterialOrder,
            order_id,
            AdjustmentReason::MaterialReceiptReversed,
        ),
        |plan, item| plan.decrease(StockTarget::material(item.material.id), item.quantity),
    )
}

impl MaterialOrderService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self {
            ledger: StockLedgerService::new(store.clone(), timeout),
            store,
            timeout,
        }
    }

    async fn resolve_items(
        &self,
        inputs: &[MaterialOrderItemInput],
    ) -> AppResult<Vec<MaterialOrderItem>> {
        let mut items = Vec::with_capacity(inputs.len());

        for input in inputs {
            let material_id = required_id("materialOrderItems.material.id", &input.material.id)?;
            validate_item_quantity(input.quantity)
                .map_err(|msg| AppError::validation("materialOrderItems.quantity", msg))?;

            let material = with_deadline(self.timeout, self.store.get_material(material_id))
                .await?
                .ok_or_else(|| {
                    AppError::validation(
                        "materialOrderItems.material.id",
                        format!(
                            "Material {} does not exist, create the material first",
                            material_id
                        ),
                    )
                })?;

            let last_price = material
                .price_history
                .last()
                .map(|entry| entry.price)
                .unwrap_or_default();
            let price = input.material.price.unwrap_or(last_price);
            validate_amount(price)
                .map_err(|msg| AppError::validation("materialOrderItems.material.price", msg))?;
            let total_price = match input.total_price {
                Some(total_price) => total_price,
                None => line_total(price, input.quantity)
                    .map_err(|msg| AppError::validation("materialOrderItems.totalPrice", msg))?,
            };
            validate_amount(total_price)
                .map_err(|msg| AppError::validation("materialOrderItems.totalPrice", msg))?;

            let snapshot = input.material.clone();
            items.push(MaterialOrderItem {
                material: MaterialSnapshot {
                    id: material.id,
                    name: snapshot.name.unwrap_or(material.name),
                    price,
                    color: snapshot.color.unwrap_or(material.color),
                    size: snapshot.size.unwrap_or(material.size),
                    remarks: snapshot.remarks.unwrap_or(material.remarks),
                },
                quantity: input.quantity,
                total_price,
            });
        }

        Ok(items)
    }

    /// Record a material order. One placed directly as fulfilled receives its
    /// stock before the document is written.
    pub async fn insert_material_order(
        &self,
        input: InsertMaterialOrderInput,
    ) -> AppResult<MaterialOrder> {
        input.validate()?;

        let seller_id = required_id("sellerId", &input.seller_id)?;
        let order_date = required_timestamp("orderDate", &input.order_date)?;
        let delivery_date = optional_timestamp("deliveryDate", input.delivery_date.as_deref())?;
        let payment_date = optional_timestamp("paymentDate", input.payment_date.as_deref())?;
        let status = required_status("status", &input.status)?;
        let items = self.resolve_items(&input.material_order_items).await?;

        let total_amount = material_items_total(&items).ok_or_else(|| {
            AppError::validation("totalAmount", "Material order total is out of range")
        })?;
        validate_declared_total(input.total_amount, total_amount)
            .map_err(|msg| AppError::validation("totalAmount", msg))?;

        let order = MaterialOrder {
            id: Uuid::new_v4(),
            seller_id,
            seller_name: input.seller_name,
            order_date,
            delivery_date,
            payment_date,
            total_amount,
            status,
            material_order_items: items,
        };

        if status.is_fulfilled() {
            let plan = receipt_plan(order.id, order.order_date, &order.material_order_items);
            self.ledger.execute(plan).await?;

            // Received lines carry the seller's current description of each material
            for item in &order.material_order_items {
                let refreshed = with_deadline(
                    self.timeout,
                    self.store.refresh_material_details(&item.material),
                )
                .await?;
                if !refreshed {
                    tracing::warn!(
                        material_id = %item.material.id,
                        "received material no longer exists"
                    );
                }
            }
        }

        with_deadline(self.timeout, self.store.insert_material_order(&order)).await?;
        tracing::info!(
            material_order_id = %order.id,
            status = %order.status,
            items = order.material_order_items.len(),
            "material order inserted"
        );

        Ok(order)
    }

    /// Replace a material order's fields, receiving or reversing stock as
    /// the status transition requires
    pub async fn update_material_order(
        &self,
        id: Uuid,
        input: UpdateMaterialOrderInput,
    ) -> AppResult<MaterialOrderTransition> {
        input.validate()?;

        let changes = MaterialOrderChanges {
            seller_id: required_id("sellerId", &input.seller_id)?,
            seller_name: input.seller_name,
            order_date: required_timestamp("orderDate", &input.order_date)?,
            delivery_date: optional_timestamp("deliveryDate", input.delivery_date.as_deref())?,
            payment_date: optional_timestamp("paymentDate", input.payment_date.as_deref())?,
            status: required_status("status", &input.status)?,
        };
        let expected = optional_status("expectedStatus", input.expected_status.as_deref())?;

        let current = with_deadline(self.timeout, self.store.get_material_order(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Material order {}", id)))?;
        if let Some(expected) = expected {
            if expected != current.status {
                return Err(AppError::StatusConflict {
                    expected,
                    actual: current.status,
                    report: None,
                });
            }
        }

        let effect = material_order_effect(current.status, changes.status);
        tracing::info!(
            material_order_id = %id,
            previous = %current.status,
            next = %changes.status,
            effect = effect.as_str(),
            "material order status transition"
        );

        match effect {
            StockEffect::Receive => {
                let report = self
                    .ledger
                    .execute(receipt_plan(id, changes.order_date, &current.material_order_items))
                    .await?;
                self.replace(id, &changes, current.status, Some(report)).await?;
            }
            StockEffect::ReverseReceipt => {
                // Only the caller whose replace lands takes the stock back
                let previous = self.replace(id, &changes, current.status, None).await?;
                self.ledger
                    .execute(reversal_plan(id, &previous.material_order_items))
                    .await?;
            }
            StockEffect::None | StockEffect::Restock => {
                self.replace(id, &changes, current.status, None).await?;
            }
        }

        Ok(MaterialOrderTransition {
            message: format!("Material order {} updated", id),
            previous_status: current.status,
            status: changes.status,
            stock_effect: effect,
        })
    }

    /// Field replace conditioned on the status the transition was decided on
    async fn replace(
        &self,
        id: Uuid,
        changes: &MaterialOrderChanges,
        observed: OrderStatus,
        applied: Option<ReconciliationReport>,
    ) -> AppResult<MaterialOrder> {
        match with_deadline(
            self.timeout,
            self.store
                .replace_material_order(id, changes, Some(observed)),
        )
        .await?
        {
            WriteOutcome::Applied(previous) => Ok(previous),
            WriteOutcome::NotFound => Err(AppError::NotFound(format!("Material order {}", id))),
            WriteOutcome::StatusMismatch(actual) => {
                let conflict = AppError::StatusConflict {
                    expected: observed,
                    actual,
                    report: None,
                };
                match applied {
                    Some(report) if !report.applied.is_empty() => {
                        tracing::warn!(
                            material_order_id = %id,
                            applied = report.applied.len(),
                            "material order changed while its receipt was applied"
                        );
                        Err(conflict.with_report(report))
                    }
                    _ => Err(conflict),
                }
            }
        }
    }

    /// Append items; an already fulfilled order receives them immediately
    pub async fn append_items(
        &self,
        id: Uuid,
        inputs: Vec<MaterialOrderItemInput>,
    ) -> AppResult<MaterialAppendOutcome> {
        if inputs.is_empty() {
            return Err(AppError::validation(
                "materialOrderItems",
                "At least one item is required",
            ));
        }

        let current = with_deadline(self.timeout, self.store.get_material_order(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Material order {}", id)))?;
        if current.status.is_cancelled() {
            return Err(AppError::OrderCancelled(id));
        }

        let items = self.resolve_items(&inputs).await?;
        material_items_total(&items)
            .and_then(|appended| current.total_amount.checked_add(appended))
            .ok_or_else(|| {
                AppError::validation("totalAmount", "Material order total is out of range")
            })?;

        let updated = match with_deadline(
            self.timeout,
            self.store
                .append_material_order_items(id, &items, Some(current.status)),
        )
        .await?
        {
            WriteOutcome::Applied(updated) => updated,
            WriteOutcome::NotFound => {
                return Err(AppError::NotFound(format!("Material order {}", id)))
            }
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
            material_order_id = %id,
            appended = items.len(),
            total = %updated.total_amount,
            "material order items appended"
        );

        let received = updated.status.is_fulfilled();
        if received {
            self.ledger
                .execute(receipt_plan(id, updated.order_date, &items))
                .await?;
        }

        Ok(MaterialAppendOutcome {
            message: format!("{} item(s) added to material order {}", items.len(), id),
            material_order_id: id,
            total_amount: updated.total_amount,
            received,
        })
    }

    pub async fn delete_material_order(&self, id: Uuid) -> AppResult<()> {
        let deleted = with_deadline(self.timeout, self.store.delete_material_order(id)).await?;
        if !deleted {
            return Err(AppError::NotFound(format!("Material order {}", id)));
        }
        tracing::info!(material_order_id = %id, "material order deleted");
        Ok(())
    }

    pub async fn get_material_order(&self, id: Uuid) -> AppResult<MaterialOrder> {
        with_deadline(self.timeout, self.store.get_material_order(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Material order {}", id)))
    }

    pub async fn list_material_orders(
        &self,
        query: MaterialOrderQuery,
    ) -> AppResult<Vec<MaterialOrder>> {
        let filter = MaterialOrderFilter {
            id: optional_id("id", query.id.as_deref())?,
            seller_id: optional_id("sellerId", query.seller_id.as_deref())?,
            status: optional_status("status", query.status.as_deref())?,
        };
        Ok(with_deadline(self.timeout, self.store.list_material_orders(&filter)).await?)
    }
}
