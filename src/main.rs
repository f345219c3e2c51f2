use std::sync::Arc;

use anyhow::Result;

use homecrew_backend::lifecycle::BookingLifecycle;
use homecrew_backend::services::{PgNotifier, SystemClock};
use homecrew_backend::store::PgStore;
use homecrew_backend::{app, config, db, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting homecrew backend"
    );

    // Create database pool
    let pool = db::create_pool(&settings).await?;

    // Wire the lifecycle engine against Postgres
    let store = Arc::new(PgStore::new(pool.clone()));
    let notifier = Arc::new(PgNotifier::new(pool.clone()));
    let lifecycle = Arc::new(BookingLifecycle::new(
        store.clone(),
        store,
        notifier,
        Arc::new(SystemClock),
    ));

    // Create application state
    let state = app::AppState::new(pool, settings.clone(), lifecycle);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
