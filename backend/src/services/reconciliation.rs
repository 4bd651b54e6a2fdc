//! Stock plans and the report of how far one got
//!
//! A transition's stock work is planned up front as an ordered list of
//! deltas, then applied one record at a time. Nothing is rolled back when a
//! step fails; the report tells an operator exactly which records moved.

use serde::Serialize;
use shared::{
    AdjustmentReason, AdjustmentSource, AggregateKind, PriceHistoryEntry, StockTarget,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    Increase,
    Decrease,
}

/// One planned ledger operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDelta {
    pub target: StockTarget,
    pub amount: i64,
    pub direction: StockDirection,
    /// Price recorded on the material once the increase lands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceHistoryEntry>,
}

/// Ordered stock work implied by one aggregate transition
#[derive(Debug, Clone)]
pub struct StockPlan {
    source: AdjustmentSource,
    deltas: Vec<StockDelta>,
}

impl StockPlan {
    pub fn new(kind: AggregateKind, id: Uuid, reason: AdjustmentReason) -> Self {
        Self {
            source: AdjustmentSource { kind, id, reason },
            deltas: Vec::new(),
        }
    }

    pub fn decrease(mut self, target: StockTarget, amount: i64) -> Self {
        self.deltas.push(StockDelta {
            target,
            amount,
            direction: StockDirection::Decrease,
            price: None,
        });
        self
    }

    pub fn increase(mut self, target: StockTarget, amount: i64) -> Self {
        self.deltas.push(StockDelta {
            target,
            amount,
            direction: StockDirection::Increase,
            price: None,
        });
        self
    }

    /// Increase a material and append a price-history entry for it
    pub fn receive(mut self, target: StockTarget, amount: i64, price: PriceHistoryEntry) -> Self {
        self.deltas.push(StockDelta {
            target,
            amount,
            direction: StockDirection::Increase,
            price: Some(price),
        });
        self
    }

    pub fn source(&self) -> AdjustmentSource {
        self.source
    }

    pub fn deltas(&self) -> &[StockDelta] {
        &self.deltas
    }

    pub(crate) fn into_deltas(self) -> Vec<StockDelta> {
        self.deltas
    }
}

/// Intended versus completed steps of a stock plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub aggregate_kind: AggregateKind,
    pub aggregate_id: Uuid,
    pub reason: AdjustmentReason,
    pub applied: Vec<StockDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<StockDelta>,
    pub pending: Vec<StockDelta>,
}

impl ReconciliationReport {
    pub fn start(source: AdjustmentSource, planned: usize) -> Self {
        Self {
            aggregate_kind: source.kind,
            aggregate_id: source.id,
            reason: source.reason,
            applied: Vec::with_capacity(planned),
            failed: None,
            pending: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_none() && self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_keeps_item_order() {
        let first = StockTarget::product(Uuid::new_v4());
        let second = StockTarget::product(Uuid::new_v4());
        let plan = StockPlan::new(AggregateKind::Order, Uuid::new_v4(), AdjustmentReason::OrderPlaced)
            .decrease(first, 4)
            .decrease(second, 1);

        let targets: Vec<_> = plan.deltas().iter().map(|d| d.target).collect();
        assert_eq!(targets, vec![first, second]);
        assert!(plan
            .deltas()
            .iter()
            .all(|d| d.direction == StockDirection::Decrease));
    }

    #[test]
    fn report_serializes_without_empty_failure() {
        let source = AdjustmentSource {
            kind: AggregateKind::MaterialOrder,
            id: Uuid::nil(),
            reason: AdjustmentReason::MaterialReceived,
        };
        let report = ReconciliationReport::start(source, 0);
        let json = serde_json::to_value(&report).unwrap();

        assert!(report.is_complete());
        assert_eq!(json["aggregateKind"], "material_order");
        assert_eq!(json["reason"], "material_received");
        assert!(json.get("failed").is_none());
    }
}
