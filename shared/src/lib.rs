//! Shared types and models for the inventory management backend
//!
//! Stock records, order aggregates, the order lifecycle and the validation
//! helpers used by every layer of the backend.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
