//! Issue service: orchestrates lifecycle, voting, query, and stats.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::issue::{Issue, IssueUpdate, NewIssue};
use crate::domain::query::{self, QueryParams, QueryResult};
use crate::domain::stats::{self, DerivedStats};
use crate::domain::status::Status;
use crate::domain::store::IssueStore;
use crate::domain::vote::{ToggleAction, VoteCounts, VoteKind};
use crate::domain::IssueId;
use crate::error::GatewayError;
use crate::persistence::PostgresPersistence;

/// Orchestration layer for all issue operations.
///
/// Stateless coordinator: owns a reference to [`IssueStore`] for runtime
/// state and an optional [`PostgresPersistence`] mirror for durability.
/// Every mutation follows the pattern: validate → mutate store → write
/// through to persistence → log → return result. Reads always recompute
/// from the current store state, so the list, map, and stats views never
/// diverge.
#[derive(Debug, Clone)]
pub struct IssueService {
    store: Arc<IssueStore>,
    persistence: Option<PostgresPersistence>,
}

impl IssueService {
    /// Creates a new `IssueService`.
    #[must_use]
    pub fn new(store: Arc<IssueStore>, persistence: Option<PostgresPersistence>) -> Self {
        Self { store, persistence }
    }

    /// Returns a reference to the inner [`IssueStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<IssueStore> {
        &self.store
    }

    /// Validates a citizen submission and creates the issue in
    /// `submitted` status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] listing every invalid field;
    /// persistence failures are passed through unchanged.
    pub async fn create_issue(&self, input: NewIssue) -> Result<Issue, GatewayError> {
        let now = Utc::now();
        let issue = input.into_issue(now)?;
        let issue_id = self.store.insert(issue.clone()).await?;

        if let Some(persistence) = &self.persistence {
            persistence.insert_issue(&issue).await?;
        }

        tracing::info!(%issue_id, category = %issue.category, "issue created");
        Ok(issue)
    }

    /// Applies a lifecycle transition and records the audit trail entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown issue and
    /// [`GatewayError::InvalidTransition`] when the target status is not
    /// reachable from the current one.
    pub async fn transition_issue(
        &self,
        issue_id: IssueId,
        new_status: Status,
        comment: Option<String>,
        author_id: Uuid,
    ) -> Result<Issue, GatewayError> {
        let now = Utc::now();
        let issue = self
            .store
            .transition(issue_id, new_status, comment.clone(), author_id, now)
            .await?;

        if let Some(persistence) = &self.persistence {
            persistence.update_issue_status(&issue).await?;
            persistence
                .append_update(&IssueUpdate {
                    issue_id,
                    status: new_status,
                    comment,
                    author_id,
                    created_at: now,
                    is_public: true,
                })
                .await?;
        }

        tracing::info!(%issue_id, status = %new_status, "issue transitioned");
        Ok(issue)
    }

    /// Appends an audit comment without changing the issue's status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the issue does not exist.
    pub async fn annotate_issue(
        &self,
        issue_id: IssueId,
        comment: String,
        is_public: bool,
        author_id: Uuid,
    ) -> Result<IssueUpdate, GatewayError> {
        let now = Utc::now();
        let update = self
            .store
            .annotate(issue_id, comment, is_public, author_id, now)
            .await?;

        if let Some(persistence) = &self.persistence {
            persistence.append_update(&update).await?;
        }

        tracing::info!(%issue_id, "issue annotated");
        Ok(update)
    }

    /// Toggles a vote for the given user; identity is explicit, never
    /// ambient.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthenticated`] when `user_id` is absent
    /// and [`GatewayError::NotFound`] for an unknown issue.
    pub async fn toggle_vote(
        &self,
        issue_id: IssueId,
        user_id: Option<Uuid>,
        kind: VoteKind,
    ) -> Result<ToggleAction, GatewayError> {
        let user_id = user_id.ok_or(GatewayError::Unauthenticated)?;
        let action = self.store.toggle_vote(issue_id, user_id, kind).await?;

        if let Some(persistence) = &self.persistence {
            let stored = persistence.toggle_vote(issue_id, user_id, kind).await?;
            if stored != action {
                tracing::warn!(%issue_id, %user_id, kind = %kind, "vote mirror diverged from store");
            }
        }

        tracing::info!(%issue_id, %user_id, kind = %kind, action = ?action, "vote toggled");
        Ok(action)
    }

    /// Returns current vote tallies for an issue, counted from the live
    /// ledger.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the issue does not exist.
    pub async fn vote_counts(&self, issue_id: IssueId) -> Result<VoteCounts, GatewayError> {
        // Existence check keeps counts-for-missing-issue a 404 rather
        // than a silent zero.
        let _ = self.store.get(issue_id).await?;
        Ok(self.store.vote_counts(issue_id).await)
    }

    /// Runs the query pipeline over the current issue set (list view).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidPageSize`] or
    /// [`GatewayError::InvalidCoordinate`] for invalid parameters.
    pub async fn query_issues(&self, params: &QueryParams) -> Result<QueryResult, GatewayError> {
        let issues = self.store.list_all().await;
        let upvotes = self.store.upvote_counts().await;
        query::query(issues, &upvotes, params, Utc::now())
    }

    /// Runs the same pipeline for the map view: identical filters, plus
    /// the unconditional final exclusion of coordinate-less issues.
    ///
    /// # Errors
    ///
    /// Same error conditions as [`IssueService::query_issues`].
    pub async fn query_map(&self, params: &QueryParams) -> Result<QueryResult, GatewayError> {
        let params = QueryParams {
            require_coordinates: true,
            ..params.clone()
        };
        self.query_issues(&params).await
    }

    /// Computes aggregate statistics over the full, unfiltered issue set.
    pub async fn compute_stats(&self) -> DerivedStats {
        let issues = self.store.list_all().await;
        stats::compute(&issues, Utc::now())
    }

    /// Returns a snapshot of one issue.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the issue does not exist.
    pub async fn get_issue(&self, issue_id: IssueId) -> Result<Issue, GatewayError> {
        self.store.get(issue_id).await
    }

    /// Returns the update trail for one issue in append order.
    pub async fn updates_for(&self, issue_id: IssueId) -> Vec<IssueUpdate> {
        self.store.updates_for(issue_id).await
    }
}
