//! Stock ledger tests
//!
//! - A guarded decrease never drives a quantity negative
//! - A rejected decrease modifies nothing and writes no audit entry
//! - Plans stop at the first failing step and report the rest as pending

mod common;

use std::sync::Arc;

use common::*;
use ims_backend::services::{StockLedgerService, StockPlan};
use ims_backend::store::{InMemoryStore, StockLedger, StoreError};
use ims_backend::AppError;
use proptest::prelude::*;
use shared::{AdjustmentReason, AdjustmentSource, AggregateKind, StockTarget};
use uuid::Uuid;

fn source(reason: AdjustmentReason) -> AdjustmentSource {
    AdjustmentSource {
        kind: AggregateKind::Order,
        id: Uuid::new_v4(),
        reason,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[derive(Debug, Clone)]
enum LedgerOp {
    Decrease(i64),
    Increase(i64),
}

fn ledger_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        (1i64..50).prop_map(LedgerOp::Decrease),
        (1i64..50).prop_map(LedgerOp::Increase),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Quantity equals the initial stock plus every applied delta and never drops below zero
    #[test]
    fn prop_ledger_never_negative(
        initial in 0i64..100,
        ops in prop::collection::vec(ledger_op(), 1..40),
    ) {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            let product = seed_product(&store, initial, "1").await;
            let target = StockTarget::product(product);
            let mut expected = initial;
            let mut applied = 0;

            for op in &ops {
                match *op {
                    LedgerOp::Decrease(amount) => {
                        let modified = store
                            .decrease(target, amount, source(AdjustmentReason::OrderPlaced))
                            .await
                            .unwrap();
                        prop_assert_eq!(modified, expected >= amount);
                        if modified {
                            expected -= amount;
                            applied += 1;
                        }
                    }
                    LedgerOp::Increase(amount) => {
                        let modified = store
                            .increase(target, amount, source(AdjustmentReason::OrderCancelled))
                            .await
                            .unwrap();
                        prop_assert!(modified);
                        expected += amount;
                        applied += 1;
                    }
                }
                let quantity = store.quantity(target).await.unwrap();
                prop_assert!(quantity >= 0);
                prop_assert_eq!(quantity, expected);
            }

            prop_assert_eq!(store.adjustment_count().await, applied);
            Ok(())
        })?;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[tokio::test]
async fn decrease_on_missing_record_is_rejected() {
    let store = InMemoryStore::new();
    let modified = store
        .decrease(
            StockTarget::product(Uuid::new_v4()),
            1,
            source(AdjustmentReason::OrderPlaced),
        )
        .await
        .unwrap();
    assert!(!modified);
    assert_eq!(store.adjustment_count().await, 0);
}

#[tokio::test]
async fn service_rejects_non_positive_amounts() {
    let store = InMemoryStore::new();
    let product = seed_product(&store, 5, "1").await;
    let ledger = StockLedgerService::new(Arc::new(store.clone()), TIMEOUT);

    let err = ledger
        .decrease(
            StockTarget::product(product),
            0,
            source(AdjustmentReason::OrderPlaced),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
    assert_eq!(product_quantity(&store, product).await, 5);
}

#[tokio::test]
async fn plan_stops_at_first_failure() {
    let store = InMemoryStore::new();
    let first = seed_product(&store, 5, "1").await;
    let short = seed_product(&store, 1, "1").await;
    let last = seed_product(&store, 5, "1").await;
    let ledger = StockLedgerService::new(Arc::new(store.clone()), TIMEOUT);

    let plan = StockPlan::new(AggregateKind::Order, Uuid::new_v4(), AdjustmentReason::OrderPlaced)
        .decrease(StockTarget::product(first), 2)
        .decrease(StockTarget::product(short), 3)
        .decrease(StockTarget::product(last), 1);

    let err = ledger.execute(plan).await.unwrap_err();
    let report = err.report().expect("report attached").clone();

    assert_eq!(report.applied.len(), 1);
    assert_eq!(report.failed.as_ref().map(|d| d.target.id), Some(short));
    assert_eq!(report.pending.len(), 1);
    assert_eq!(report.pending[0].target.id, last);

    assert_eq!(product_quantity(&store, first).await, 3);
    assert_eq!(product_quantity(&store, short).await, 1);
    assert_eq!(product_quantity(&store, last).await, 5);
}

#[tokio::test]
async fn complete_plan_reports_every_step_applied() {
    let store = InMemoryStore::new();
    let material = seed_material(&store, 0).await;
    let ledger = StockLedgerService::new(Arc::new(store.clone()), TIMEOUT);

    let plan = StockPlan::new(
        AggregateKind::MaterialOrder,
        Uuid::new_v4(),
        AdjustmentReason::MaterialReceived,
    )
    .increase(StockTarget::material(material), 7);

    let report = ledger.execute(plan).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(material_quantity(&store, material).await, 7);
}

#[tokio::test]
async fn increase_past_the_representable_maximum_is_refused() {
    let store = InMemoryStore::new();
    let material = seed_material(&store, i64::MAX).await;

    let err = store
        .increase(
            StockTarget::material(material),
            1,
            source(AdjustmentReason::MaterialReceived),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::OutOfRange(_)));
    assert_eq!(material_quantity(&store, material).await, i64::MAX);
    assert_eq!(store.adjustment_count().await, 0);
}
