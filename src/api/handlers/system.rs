//! System endpoints: health check and taxonomy catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::issue::{Category, Priority};
use crate::domain::status::Status;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Taxonomy catalog: the closed enumerations clients build pickers from.
#[derive(Debug, Serialize, ToSchema)]
struct TaxonomyCatalog {
    categories: Vec<&'static str>,
    priorities: Vec<&'static str>,
    statuses: Vec<StatusInfo>,
}

/// One lifecycle status and where it can go next.
#[derive(Debug, Serialize, ToSchema)]
struct StatusInfo {
    status: &'static str,
    terminal: bool,
    transitions_to: Vec<&'static str>,
}

/// `GET /config/taxonomy` — Categories, priorities, and the status graph.
#[utoipa::path(
    get,
    path = "/config/taxonomy",
    tag = "System",
    summary = "Taxonomy catalog",
    description = "Returns every category and priority value plus each lifecycle status with its allowed transitions, so clients never hardcode the graph.",
    responses(
        (status = 200, description = "Taxonomy catalog", body = TaxonomyCatalog),
    )
)]
pub async fn taxonomy_handler() -> impl IntoResponse {
    let catalog = TaxonomyCatalog {
        categories: Category::ALL.iter().map(|c| c.as_str()).collect(),
        priorities: Priority::ALL.iter().map(|p| p.as_str()).collect(),
        statuses: Status::ALL
            .iter()
            .map(|s| StatusInfo {
                status: s.as_str(),
                terminal: s.is_terminal(),
                transitions_to: s.successors().iter().map(|t| t.as_str()).collect(),
            })
            .collect(),
    };
    (StatusCode::OK, Json(catalog))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/taxonomy", get(taxonomy_handler))
}
