//! civic-gateway server entry point.
//!
//! Starts the Axum HTTP server, optionally hydrating the in-memory
//! store from PostgreSQL.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use civic_gateway::api;
use civic_gateway::app_state::AppState;
use civic_gateway::config::GatewayConfig;
use civic_gateway::domain::IssueStore;
use civic_gateway::persistence::PostgresPersistence;
use civic_gateway::service::IssueService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting civic-gateway");

    // Build domain layer
    let store = Arc::new(IssueStore::new());

    // Optionally connect the durable mirror and hydrate the store
    let persistence = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!().run(&pool).await?;

        let persistence = PostgresPersistence::new(pool);
        hydrate_store(&store, &persistence).await?;
        Some(persistence)
    } else {
        tracing::warn!("persistence disabled; running in memory only");
        None
    };

    // Build service layer
    let issue_service = Arc::new(IssueService::new(Arc::clone(&store), persistence));

    // Build application state
    let app_state = AppState { issue_service };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads issues, update trails, and votes from PostgreSQL into the
/// in-memory store.
async fn hydrate_store(
    store: &Arc<IssueStore>,
    persistence: &PostgresPersistence,
) -> anyhow::Result<()> {
    let issues = persistence.load_issues().await?;
    let issue_count = issues.len();
    for issue in issues {
        store.insert(issue).await?;
    }
    for update in persistence.load_updates().await? {
        store.restore_update(update).await;
    }
    for vote in persistence.load_votes().await? {
        store.restore_vote(vote).await;
    }
    tracing::info!(issues = issue_count, "store hydrated from database");
    Ok(())
}
