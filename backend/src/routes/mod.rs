//! Route definitions for the inventory management API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Customer orders
        .nest("/order", order_routes())
        // Supplier-side material orders
        .nest("/materialOrder", material_order_routes())
        // Stock records
        .nest("/product", product_routes())
        .nest("/material", material_routes())
        // Audit trail of stock adjustments
        .route("/stockAdjustment", get(handlers::list_adjustments))
}

/// Customer order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::insert_order))
        .route(
            "/:id",
            get(handlers::get_order)
                .patch(handlers::update_order)
                .delete(handlers::delete_order),
        )
        .route("/orderItems/:id", post(handlers::append_order_items))
}

/// Material order routes
fn material_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_material_orders).post(handlers::insert_material_order),
        )
        .route(
            "/:id",
            get(handlers::get_material_order)
                .patch(handlers::update_material_order)
                .delete(handlers::delete_material_order),
        )
        .route(
            "/materialOrderItems/:id",
            post(handlers::append_material_order_items),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:id",
            get(handlers::get_product).delete(handlers::delete_product),
        )
}

fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_materials).post(handlers::create_material))
        .route(
            "/:id",
            get(handlers::get_material).delete(handlers::delete_material),
        )
}
