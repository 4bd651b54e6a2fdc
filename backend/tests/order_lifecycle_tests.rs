//! Customer order lifecycle tests
//!
//! Stock must follow the order: placing and appending take stock,
//! the first cancellation returns it, nothing else moves it.

mod common;

use std::sync::Arc;

use common::*;
use ims_backend::services::order::{InsertOrderInput, OrderItemInput, OrderService, UpdateOrderInput};
use ims_backend::store::{InMemoryStore, StockLedger, AdjustmentFilter};
use ims_backend::AppError;
use serde_json::json;
use shared::{order_items_total, AdjustmentReason, OrderStatus, StockEffect};
use uuid::Uuid;

fn service(store: &InMemoryStore) -> OrderService {
    OrderService::new(Arc::new(store.clone()), TIMEOUT)
}

fn insert_input(customer: Uuid, status: &str, items: serde_json::Value) -> InsertOrderInput {
    serde_json::from_value(json!({
        "customerId": customer.to_string(),
        "customerName": "Somchai",
        "orderDate": "2024-03-01T10:00:00Z",
        "status": status,
        "shippingAddress": "12 Sukhumvit Rd",
        "orderItems": items,
    }))
    .unwrap()
}

fn update_input(customer: Uuid, status: &str) -> UpdateOrderInput {
    serde_json::from_value(json!({
        "customerId": customer.to_string(),
        "customerName": "Somchai",
        "orderDate": "2024-03-01T10:00:00Z",
        "status": status,
        "shippingAddress": "12 Sukhumvit Rd",
    }))
    .unwrap()
}

fn items(value: serde_json::Value) -> Vec<OrderItemInput> {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn insert_then_cancel_restores_stock_once() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "25.00").await;
    let orders = service(&store);
    let customer = Uuid::new_v4();

    let order = orders
        .insert_order(insert_input(
            customer,
            "pending",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 4 }]),
        ))
        .await
        .unwrap();
    assert_eq!(product_quantity(&store, p1).await, 6);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, dec("100.00"));

    let cancel = orders
        .update_order(order.id, update_input(customer, "cancelled"))
        .await
        .unwrap();
    assert_eq!(cancel.previous_status, OrderStatus::Pending);
    assert_eq!(cancel.stock_effect, StockEffect::Restock);
    assert_eq!(product_quantity(&store, p1).await, 10);

    // Same request again: previous status is already cancelled
    let repeat = orders
        .update_order(order.id, update_input(customer, "Canceled"))
        .await
        .unwrap();
    assert_eq!(repeat.stock_effect, StockEffect::None);
    assert_eq!(product_quantity(&store, p1).await, 10);
}

#[tokio::test]
async fn insert_records_one_adjustment_per_item() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "5").await;
    let p2 = seed_product(&store, 3, "8").await;
    let orders = service(&store);

    let order = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "confirmed",
            json!([
                { "product": { "id": p1.to_string() }, "quantity": 2 },
                { "product": { "id": p2.to_string() }, "quantity": 3 },
            ]),
        ))
        .await
        .unwrap();

    assert_eq!(product_quantity(&store, p1).await, 8);
    assert_eq!(product_quantity(&store, p2).await, 0);

    let filter = AdjustmentFilter {
        source_id: Some(order.id),
        ..Default::default()
    };
    let adjustments = store.list_adjustments(&filter).await.unwrap();
    assert_eq!(adjustments.len(), 2);
    assert!(adjustments
        .iter()
        .all(|a| a.reason == AdjustmentReason::OrderPlaced && a.delta < 0));
}

#[tokio::test]
async fn insert_with_insufficient_stock_reports_partial_application() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let p2 = seed_product(&store, 1, "1").await;
    let orders = service(&store);

    let err = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "pending",
            json!([
                { "product": { "id": p1.to_string() }, "quantity": 4 },
                { "product": { "id": p2.to_string() }, "quantity": 2 },
            ]),
        ))
        .await
        .unwrap_err();

    match &err {
        AppError::InsufficientStock { target, requested, report } => {
            assert_eq!(target.id, p2);
            assert_eq!(*requested, 2);
            let report = report.as_ref().expect("report attached");
            assert_eq!(report.applied.len(), 1);
            assert_eq!(report.applied[0].target.id, p1);
            assert!(report.pending.is_empty());
            assert!(!report.is_complete());
        }
        other => panic!("expected insufficient stock, got {:?}", other),
    }

    // The first item stays taken and the order document already exists
    assert_eq!(product_quantity(&store, p1).await, 6);
    assert_eq!(product_quantity(&store, p2).await, 1);
    assert_eq!(orders.list_orders(Default::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn validation_failures_have_no_side_effects() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let orders = service(&store);

    let bad_status = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "lost-in-transit",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 1 }]),
        ))
        .await;
    assert!(matches!(bad_status, Err(AppError::Validation { ref field, .. }) if field == "status"));

    let missing_product = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "pending",
            json!([{ "product": { "id": Uuid::new_v4().to_string() }, "quantity": 1 }]),
        ))
        .await;
    assert!(matches!(missing_product, Err(AppError::Validation { .. })));

    let zero_quantity = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "pending",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 0 }]),
        ))
        .await;
    assert!(matches!(zero_quantity, Err(AppError::Validation { .. })));

    let mut wrong_total = insert_input(
        Uuid::new_v4(),
        "pending",
        json!([{ "product": { "id": p1.to_string() }, "quantity": 1, "totalPrice": "1" }]),
    );
    wrong_total.total_amount = Some(dec("99"));
    let wrong_total = orders.insert_order(wrong_total).await;
    assert!(matches!(wrong_total, Err(AppError::Validation { ref field, .. }) if field == "totalAmount"));

    assert_eq!(product_quantity(&store, p1).await, 10);
    assert_eq!(store.adjustment_count().await, 0);
    assert!(orders.list_orders(Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn order_placed_as_cancelled_takes_no_stock() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let orders = service(&store);

    orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "cancelled",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 4 }]),
        ))
        .await
        .unwrap();

    assert_eq!(product_quantity(&store, p1).await, 10);
}

#[tokio::test]
async fn reactivating_a_cancelled_order_does_not_withdraw_stock() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let orders = service(&store);
    let customer = Uuid::new_v4();

    let order = orders
        .insert_order(insert_input(
            customer,
            "pending",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 4 }]),
        ))
        .await
        .unwrap();
    orders
        .update_order(order.id, update_input(customer, "cancelled"))
        .await
        .unwrap();

    let reactivated = orders
        .update_order(order.id, update_input(customer, "confirmed"))
        .await
        .unwrap();
    assert_eq!(reactivated.stock_effect, StockEffect::None);
    assert_eq!(product_quantity(&store, p1).await, 10);
}

#[tokio::test]
async fn update_missing_order_is_not_found() {
    let store = InMemoryStore::new();
    let result = service(&store)
        .update_order(Uuid::new_v4(), update_input(Uuid::new_v4(), "shipped"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn expected_status_guards_concurrent_cancellation() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let orders = service(&store);
    let customer = Uuid::new_v4();

    let order = orders
        .insert_order(insert_input(
            customer,
            "pending",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 4 }]),
        ))
        .await
        .unwrap();

    let mut first = update_input(customer, "cancelled");
    first.expected_status = Some("pending".to_string());
    orders.update_order(order.id, first).await.unwrap();

    // A second writer that also saw "pending" loses the race
    let mut second = update_input(customer, "cancelled");
    second.expected_status = Some("pending".to_string());
    let err = orders.update_order(order.id, second).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::StatusConflict {
            expected: OrderStatus::Pending,
            actual: OrderStatus::Cancelled,
            ..
        }
    ));
    assert_eq!(product_quantity(&store, p1).await, 10);
}

#[tokio::test]
async fn append_takes_stock_and_grows_total() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "2.50").await;
    let p2 = seed_product(&store, 5, "4").await;
    let orders = service(&store);

    let order = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "processing",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 2 }]),
        ))
        .await
        .unwrap();

    let outcome = orders
        .append_items(
            order.id,
            items(json!([{ "product": { "id": p2.to_string() }, "quantity": 3 }])),
        )
        .await
        .unwrap();

    assert_eq!(outcome.total_amount, dec("17.00"));
    assert_eq!(product_quantity(&store, p2).await, 2);

    let stored = orders.get_order(order.id).await.unwrap();
    assert_eq!(stored.order_items.len(), 2);
    assert_eq!(Some(stored.total_amount), order_items_total(&stored.order_items));
}

#[tokio::test]
async fn append_to_cancelled_order_is_rejected_without_mutation() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let orders = service(&store);
    let customer = Uuid::new_v4();

    let order = orders
        .insert_order(insert_input(
            customer,
            "pending",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 4 }]),
        ))
        .await
        .unwrap();
    orders
        .update_order(order.id, update_input(customer, "cancelled"))
        .await
        .unwrap();
    let adjustments_before = store.adjustment_count().await;

    let err = orders
        .append_items(
            order.id,
            items(json!([{ "product": { "id": p1.to_string() }, "quantity": 1 }])),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::OrderCancelled(id) if id == order.id));
    assert_eq!(product_quantity(&store, p1).await, 10);
    assert_eq!(store.adjustment_count().await, adjustments_before);
    assert_eq!(orders.get_order(order.id).await.unwrap().order_items.len(), 1);
}

#[tokio::test]
async fn delete_leaves_stock_untouched() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let orders = service(&store);

    let order = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "pending",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 4 }]),
        ))
        .await
        .unwrap();

    orders.delete_order(order.id).await.unwrap();
    assert_eq!(product_quantity(&store, p1).await, 6);
    assert!(matches!(
        orders.delete_order(order.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn append_keeps_items_when_a_later_decrease_fails() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let p2 = seed_product(&store, 5, "2").await;
    let p3 = seed_product(&store, 1, "3").await;
    let orders = service(&store);

    let order = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "pending",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 1 }]),
        ))
        .await
        .unwrap();

    let err = orders
        .append_items(
            order.id,
            items(json!([
                { "product": { "id": p2.to_string() }, "quantity": 3 },
                { "product": { "id": p3.to_string() }, "quantity": 2 },
                { "product": { "id": p2.to_string() }, "quantity": 1 },
            ])),
        )
        .await
        .unwrap_err();

    match &err {
        AppError::InsufficientStock { target, requested, report } => {
            assert_eq!(target.id, p3);
            assert_eq!(*requested, 2);
            let report = report.as_ref().expect("report attached");
            assert_eq!(report.reason, AdjustmentReason::OrderItemsAppended);
            assert_eq!(report.applied.len(), 1);
            assert_eq!(report.applied[0].target.id, p2);
            assert_eq!(report.failed.as_ref().map(|d| d.target.id), Some(p3));
            assert_eq!(report.pending.len(), 1);
            assert_eq!(report.pending[0].target.id, p2);
        }
        other => panic!("expected insufficient stock, got {:?}", other),
    }

    // The append was persisted before stock was taken
    let stored = orders.get_order(order.id).await.unwrap();
    assert_eq!(stored.order_items.len(), 4);
    assert_eq!(stored.total_amount, dec("15"));
    assert_eq!(product_quantity(&store, p1).await, 9);
    assert_eq!(product_quantity(&store, p2).await, 2);
    assert_eq!(product_quantity(&store, p3).await, 1);
}

#[tokio::test]
async fn concurrent_cancels_restock_exactly_once() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let orders = service(&store);
    let customer = Uuid::new_v4();

    let order = orders
        .insert_order(insert_input(
            customer,
            "processing",
            json!([{ "product": { "id": p1.to_string() }, "quantity": 4 }]),
        ))
        .await
        .unwrap();
    assert_eq!(product_quantity(&store, p1).await, 6);

    let (first, second) = tokio::join!(
        orders.update_order(order.id, update_input(customer, "cancelled")),
        orders.update_order(order.id, update_input(customer, "cancelled")),
    );
    let effects = [first.unwrap().stock_effect, second.unwrap().stock_effect];

    assert_eq!(
        effects.iter().filter(|e| **e == StockEffect::Restock).count(),
        1
    );
    assert_eq!(product_quantity(&store, p1).await, 10);
}

#[tokio::test]
async fn overflowing_totals_are_rejected_before_stock_moves() {
    let store = InMemoryStore::new();
    let p1 = seed_product(&store, 10, "1").await;
    let orders = service(&store);

    let err = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "pending",
            json!([
                { "product": { "id": p1.to_string() }, "quantity": 1, "totalPrice": "50000000000000000000000000000" },
                { "product": { "id": p1.to_string() }, "quantity": 1, "totalPrice": "50000000000000000000000000000" },
            ]),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "totalAmount"));
    assert_eq!(product_quantity(&store, p1).await, 10);
    assert!(orders.list_orders(Default::default()).await.unwrap().is_empty());

    let err = orders
        .insert_order(insert_input(
            Uuid::new_v4(),
            "pending",
            json!([{
                "product": { "id": p1.to_string(), "unitPrice": "50000000000000000000000000000" },
                "quantity": 2,
            }]),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "orderItems.totalPrice"));
}
