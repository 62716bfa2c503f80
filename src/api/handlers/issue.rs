//! Issue handlers: create, list, map, detail, transition, annotate.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AnnotateRequest, CreateIssueRequest, IssueDetailResponse, IssueDto, IssueListResponse,
    IssueQueryDto, IssueUpdateDto, TransitionRequest, VoteCountsDto,
};
use crate::app_state::AppState;
use crate::domain::status::Status;
use crate::domain::IssueId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /issues` — Submit a new civic issue.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] listing every invalid field.
#[utoipa::path(
    post,
    path = "/api/v1/issues",
    tag = "Issues",
    summary = "Submit a new issue",
    description = "Validates the submission and creates the issue in `submitted` status. Anonymous submissions must carry full reporter contact details.",
    request_body = CreateIssueRequest,
    responses(
        (status = 201, description = "Issue created successfully", body = IssueDto),
        (status = 400, description = "Validation failed; every invalid field is listed", body = ErrorResponse),
    )
)]
pub async fn create_issue(
    State(state): State<AppState>,
    Json(req): Json<CreateIssueRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let issue = state.issue_service.create_issue(req.into()).await?;
    Ok((StatusCode::CREATED, Json(IssueDto::from(issue))))
}

/// `GET /issues` — List issues with filtering, sorting, and pagination.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid filter values or page size.
#[utoipa::path(
    get,
    path = "/api/v1/issues",
    tag = "Issues",
    summary = "List issues",
    description = "Returns one filtered, sorted, paginated page of issues. The map endpoint runs the identical pipeline, so both views always agree.",
    responses(
        (status = 200, description = "Paginated issue list", body = IssueListResponse),
        (status = 400, description = "Invalid filter or page size", body = ErrorResponse),
    )
)]
pub async fn list_issues(
    State(state): State<AppState>,
    Query(query): Query<IssueQueryDto>,
) -> Result<impl IntoResponse, GatewayError> {
    let page = query.page;
    let per_page = query.per_page;
    let params = query.into_params()?;
    let result = state.issue_service.query_issues(&params).await?;
    Ok(Json(IssueListResponse::from_result(result, page, per_page)))
}

/// `GET /issues/map` — Map view: same filters, only located issues.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid filter values or page size.
#[utoipa::path(
    get,
    path = "/api/v1/issues/map",
    tag = "Issues",
    summary = "List issues for the map",
    description = "Identical to the list endpoint, with issues lacking coordinates excluded as a final unconditional step.",
    responses(
        (status = 200, description = "Paginated issue list (located issues only)", body = IssueListResponse),
        (status = 400, description = "Invalid filter or page size", body = ErrorResponse),
    )
)]
pub async fn map_issues(
    State(state): State<AppState>,
    Query(query): Query<IssueQueryDto>,
) -> Result<impl IntoResponse, GatewayError> {
    let page = query.page;
    let per_page = query.per_page;
    let params = query.into_params()?;
    let result = state.issue_service.query_map(&params).await?;
    Ok(Json(IssueListResponse::from_result(result, page, per_page)))
}

/// `GET /issues/:id` — Issue detail with votes and public update trail.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if the issue does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/issues/{id}",
    tag = "Issues",
    summary = "Get issue details",
    description = "Returns the issue, its current vote tallies, and the citizen-visible update trail.",
    params(
        ("id" = uuid::Uuid, Path, description = "Issue UUID"),
    ),
    responses(
        (status = 200, description = "Issue details", body = IssueDetailResponse),
        (status = 404, description = "Issue not found", body = ErrorResponse),
    )
)]
pub async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let issue_id = IssueId::from_uuid(id);
    let issue = state.issue_service.get_issue(issue_id).await?;
    let counts = state.issue_service.vote_counts(issue_id).await?;
    let updates: Vec<IssueUpdateDto> = state
        .issue_service
        .updates_for(issue_id)
        .await
        .into_iter()
        .filter(|u| u.is_public)
        .map(IssueUpdateDto::from)
        .collect();

    Ok(Json(IssueDetailResponse {
        issue: IssueDto::from(issue),
        votes: VoteCountsDto::from(counts),
        updates,
    }))
}

/// `POST /issues/:id/transition` — Apply a lifecycle status change.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] or
/// [`GatewayError::InvalidTransition`].
#[utoipa::path(
    post,
    path = "/api/v1/issues/{id}/transition",
    tag = "Issues",
    summary = "Transition issue status",
    description = "Moves the issue along the lifecycle graph and appends an audit trail entry. Unreachable targets are rejected with 409.",
    params(
        ("id" = uuid::Uuid, Path, description = "Issue UUID"),
    ),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Issue after the transition", body = IssueDto),
        (status = 404, description = "Issue not found", body = ErrorResponse),
        (status = 409, description = "Transition violates the lifecycle graph", body = ErrorResponse),
    )
)]
pub async fn transition_issue(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<TransitionRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let new_status: Status = req.status.parse().map_err(|_| GatewayError::Validation {
        fields: vec!["status".to_string()],
    })?;
    let issue = state
        .issue_service
        .transition_issue(IssueId::from_uuid(id), new_status, req.comment, req.author_id)
        .await?;
    Ok(Json(IssueDto::from(issue)))
}

/// `POST /issues/:id/annotations` — Append an audit comment.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if the issue does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/issues/{id}/annotations",
    tag = "Issues",
    summary = "Annotate an issue",
    description = "Appends an audit trail entry carrying the issue's current status without changing it. Allowed in every status, terminal ones included.",
    params(
        ("id" = uuid::Uuid, Path, description = "Issue UUID"),
    ),
    request_body = AnnotateRequest,
    responses(
        (status = 201, description = "Appended trail entry", body = IssueUpdateDto),
        (status = 404, description = "Issue not found", body = ErrorResponse),
    )
)]
pub async fn annotate_issue(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AnnotateRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let update = state
        .issue_service
        .annotate_issue(IssueId::from_uuid(id), req.comment, req.is_public, req.author_id)
        .await?;
    Ok((StatusCode::CREATED, Json(IssueUpdateDto::from(update))))
}

/// Issue routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/issues", post(create_issue).get(list_issues))
        .route("/issues/map", get(map_issues))
        .route("/issues/{id}", get(get_issue))
        .route("/issues/{id}/transition", post(transition_issue))
        .route("/issues/{id}/annotations", post(annotate_issue))
}
