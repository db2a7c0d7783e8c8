use std::sync::Arc;

use storefront_admin_api::{
    app,
    auth::JwtIdentity,
    config::config,
    database::{Database, DatabaseManager, MemoryDatabase, PgDatabase},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = config();
    tracing::info!("Starting Storefront Admin API in {:?} mode", config.environment);

    let db: Arc<dyn Database> = match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Arc::new(PgDatabase::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            Arc::new(MemoryDatabase::new())
        }
    };

    if storefront_admin_api::is_development!() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("Using the built-in development JWT secret");
    }
    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is empty; every mutating request will be rejected as unauthenticated");
    }
    let identity = Arc::new(JwtIdentity::new(
        config.security.jwt_secret.clone(),
        config.security.jwt_expiry_hours,
    ));

    let app = app(AppState::new(db, identity), config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Storefront Admin API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
