//! Stock ledger service
//!
//! Wraps the store's guarded quantity mutations with per-call deadlines and
//! turns an unmodified record into a typed error naming it.

use std::sync::Arc;
use std::time::Duration;

use shared::{validate_item_quantity, AdjustmentSource, StockAdjustment, StockKind, StockTarget};

use super::input::optional_id;
use super::reconciliation::{ReconciliationReport, StockDelta, StockDirection, StockPlan};
use crate::error::{AppError, AppResult};
use crate::store::{with_deadline, AdjustmentFilter, Store};

/// Query parameters for listing audit entries
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentQuery {
    pub stock_kind: Option<String>,
    pub stock_id: Option<String>,
    pub source_id: Option<String>,
}

#[derive(Clone)]
pub struct StockLedgerService {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl StockLedgerService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Decrease a record only if enough stock is on hand
    pub async fn decrease(
        &self,
        target: StockTarget,
        amount: i64,
        source: AdjustmentSource,
    ) -> AppResult<()> {
        validate_item_quantity(amount).map_err(|msg| AppError::validation("quantity", msg))?;

        let modified = with_deadline(self.timeout, self.store.decrease(target, amount, source)).await?;
        if !modified {
            tracing::warn!(%target, amount, reason = source.reason.as_str(), "stock decrease rejected");
            return Err(AppError::InsufficientStock {
                target,
                requested: amount,
                report: None,
            });
        }

        tracing::debug!(%target, amount, reason = source.reason.as_str(), "stock decreased");
        Ok(())
    }

    pub async fn increase(
        &self,
        target: StockTarget,
        amount: i64,
        source: AdjustmentSource,
    ) -> AppResult<()> {
        validate_item_quantity(amount).map_err(|msg| AppError::validation("quantity", msg))?;

        let modified = with_deadline(self.timeout, self.store.increase(target, amount, source)).await?;
        if !modified {
            tracing::warn!(%target, amount, reason = source.reason.as_str(), "stock increase found no record");
            return Err(AppError::StockRecordMissing {
                target,
                requested: amount,
                report: None,
            });
        }

        tracing::debug!(%target, amount, reason = source.reason.as_str(), "stock increased");
        Ok(())
    }

    async fn apply(&self, delta: &StockDelta, source: AdjustmentSource) -> AppResult<()> {
        match delta.direction {
            StockDirection::Decrease => self.decrease(delta.target, delta.amount, source).await,
            StockDirection::Increase => {
                self.increase(delta.target, delta.amount, source).await?;
                if let Some(entry) = &delta.price {
                    let recorded = with_deadline(
                        self.timeout,
                        self.store.append_price_history(delta.target.id, entry.clone()),
                    )
                    .await?;
                    if !recorded {
                        return Err(AppError::StockRecordMissing {
                            target: delta.target,
                            requested: delta.amount,
                            report: None,
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Apply every delta of a plan in order.
    ///
    /// Stops at the first failure. Deltas already applied stay applied and
    /// the returned error carries a report of applied, failed and pending
    /// steps.
    pub async fn execute(&self, plan: StockPlan) -> AppResult<ReconciliationReport> {
        let source = plan.source();
        let mut report = ReconciliationReport::start(source, plan.deltas().len());
        let mut remaining = plan.into_deltas().into_iter();

        while let Some(delta) = remaining.next() {
            match self.apply(&delta, source).await {
                Ok(()) => report.applied.push(delta),
                Err(err) => {
                    report.failed = Some(delta);
                    report.pending = remaining.collect();
                    tracing::warn!(
                        aggregate = source.kind.as_str(),
                        aggregate_id = %source.id,
                        applied = report.applied.len(),
                        pending = report.pending.len(),
                        "stock plan stopped partway: {}",
                        err
                    );
                    return Err(err.with_report(report));
                }
            }
        }

        Ok(report)
    }

    pub async fn list_adjustments(&self, query: AdjustmentQuery) -> AppResult<Vec<StockAdjustment>> {
        let stock_kind = match query.stock_kind.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(StockKind::parse(raw).ok_or_else(|| {
                AppError::validation("stockKind", "Stock kind must be product or material")
            })?),
        };
        let filter = AdjustmentFilter {
            stock_kind,
            stock_id: optional_id("stockId", query.stock_id.as_deref())?,
            source_id: optional_id("sourceId", query.source_id.as_deref())?,
        };

        Ok(with_deadline(self.timeout, self.store.list_adjustments(&filter)).await?)
    }
}
