use std::sync::Arc;

use anyhow::Context;
use tower_http::trace::TraceLayer;

use crate::config::{config, AppConfig};
use crate::database::{DatabaseManager, MemoryStore, PgStore};
use crate::routes;
use crate::state::AppState;
use crate::views::templates;

pub async fn handle(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let config = config();
    config.validate()?;
    templates::check()?;

    tracing::info!("Starting resource-forum in {:?} mode", config.environment);

    let state = build_state(config).await?;
    let mut app = routes::app(state);
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// PostgreSQL when `DATABASE_URL` is set, otherwise the in-memory store.
async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL is not set; using the in-memory store, data is lost on exit");
        return Ok(AppState::new(Arc::new(MemoryStore::new()), &config.security));
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }
    Ok(AppState::new(Arc::new(PgStore::new(pool)), &config.security))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
