//! Business logic services for the inventory management backend

pub mod catalog;
pub mod input;
pub mod ledger;
pub mod material_order;
pub mod order;
pub mod reconciliation;

pub use catalog::CatalogService;
pub use ledger::StockLedgerService;
pub use material_order::MaterialOrderService;
pub use order::OrderService;
pub use reconciliation::{ReconciliationReport, StockDelta, StockDirection, StockPlan};
