//! Stats handler: aggregate counts over the global issue set.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::stats::DerivedStats;

/// `GET /stats` — Aggregate statistics.
///
/// Always computed over the full, unfiltered issue set, independent of
/// whatever filters the list or map currently apply.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "Stats",
    summary = "Aggregate statistics",
    description = "Returns totals by status, category, and priority plus a trailing 7-day count, recomputed from the current issue set on every call.",
    responses(
        (status = 200, description = "Derived statistics", body = DerivedStats),
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.issue_service.compute_stats().await;
    Json(stats)
}

/// Stats routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}
