//! Inventory Management Backend - Server
//!
//! Serves the order, material-order and stock endpoints over HTTP.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use ims_backend::{
    config::{Config, StoreBackend},
    create_app,
    store::{InMemoryStore, PgStore, Store},
    AppState,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ims_server=debug,ims_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Inventory Management Server");
    tracing::info!("Environment: {}", config.environment);

    let store: Arc<dyn Store> = match config.store.backend {
        StoreBackend::Postgres => {
            // Create database connection pool
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;

            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Arc::new(PgStore::new(db_pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store, data is lost on shutdown");
            Arc::new(InMemoryStore::new())
        }
    };

    // Create application state
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(store, config);

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
