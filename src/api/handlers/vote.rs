//! Vote handlers: idempotent toggle and current tallies.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{VoteCountsDto, VoteRequest, VoteToggleResponse};
use crate::app_state::AppState;
use crate::domain::vote::VoteKind;
use crate::domain::IssueId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /issues/:id/votes` — Toggle a vote for the calling user.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthenticated`] for anonymous requests and
/// [`GatewayError::NotFound`] for unknown issues.
#[utoipa::path(
    post,
    path = "/api/v1/issues/{id}/votes",
    tag = "Votes",
    summary = "Toggle a vote",
    description = "Adds the vote if the `(issue, user, kind)` triple is absent, removes it otherwise. Calling twice with identical arguments returns `added` then `removed`.",
    params(
        ("id" = uuid::Uuid, Path, description = "Issue UUID"),
    ),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Toggle outcome", body = VoteToggleResponse),
        (status = 401, description = "Anonymous voting is not allowed", body = ErrorResponse),
        (status = 404, description = "Issue not found", body = ErrorResponse),
    )
)]
pub async fn toggle_vote(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let kind: VoteKind = req.kind.parse().map_err(|_| GatewayError::Validation {
        fields: vec!["kind".to_string()],
    })?;
    let action = state
        .issue_service
        .toggle_vote(IssueId::from_uuid(id), req.user_id, kind)
        .await?;
    Ok(Json(VoteToggleResponse { action }))
}

/// `GET /issues/:id/votes` — Current vote tallies.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if the issue does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/issues/{id}/votes",
    tag = "Votes",
    summary = "Get vote counts",
    description = "Returns upvote and importance tallies counted from the live ledger at read time.",
    params(
        ("id" = uuid::Uuid, Path, description = "Issue UUID"),
    ),
    responses(
        (status = 200, description = "Current tallies", body = VoteCountsDto),
        (status = 404, description = "Issue not found", body = ErrorResponse),
    )
)]
pub async fn get_vote_counts(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let counts = state
        .issue_service
        .vote_counts(IssueId::from_uuid(id))
        .await?;
    Ok(Json(VoteCountsDto::from(counts)))
}

/// Vote routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/issues/{id}/votes", post(toggle_vote).get(get_vote_counts))
}
