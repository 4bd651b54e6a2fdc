//! Inventory Management Backend
//!
//! Order and material-order lifecycles kept consistent with product and
//! material stock levels.

use std::{sync::Arc, time::Duration};

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
use store::Store;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Deadline applied to every individual store call
    pub fn store_timeout(&self) -> Duration {
        self.config.store.timeout()
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", axum::routing::get(root))
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Inventory Management API v1.0"
}
