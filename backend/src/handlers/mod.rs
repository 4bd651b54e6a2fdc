//! HTTP handlers for the inventory management API

pub mod catalog;
pub mod health;
pub mod ledger;
pub mod material_order;
pub mod order;

pub use catalog::*;
pub use health::*;
pub use ledger::*;
pub use material_order::*;
pub use order::*;
