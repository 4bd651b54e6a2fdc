//! HTTP handlers for the stock adjustment audit trail

use axum::{
    extract::{Query, State},
    Json,
};
use shared::StockAdjustment;

use crate::error::AppResult;
use crate::services::ledger::{AdjustmentQuery, StockLedgerService};
use crate::AppState;

/// List stock adjustments, newest first
pub async fn list_adjustments(
    State(state): State<AppState>,
    Query(query): Query<AdjustmentQuery>,
) -> AppResult<Json<Vec<StockAdjustment>>> {
    let service = StockLedgerService::new(state.store.clone(), state.store_timeout());
    let adjustments = service.list_adjustments(query).await?;
    Ok(Json(adjustments))
}
