//! Domain models for the inventory management backend

mod material_order;
mod order;
mod status;
mod stock;

pub use material_order::*;
pub use order::*;
pub use status::*;
pub use stock::*;
