//! Concurrent in-memory issue store: the runtime source of truth.
//!
//! [`IssueStore`] holds the issue map, the append-only update trail, and
//! the vote ledger behind [`tokio::sync::RwLock`]s. Status transitions
//! re-check the current status under the write lock (compare-and-set
//! semantics), and vote toggles run entirely under the ledger's write
//! lock, so two concurrent toggles of the same `(issue, user, kind)`
//! triple can never both land as "added".
//!
//! Lock order when multiple locks are held: `issues` before `updates`.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::IssueId;
use super::issue::{Issue, IssueUpdate};
use super::status::Status;
use super::vote::{ToggleAction, Vote, VoteCounts, VoteKind};
use crate::error::GatewayError;

/// Central store for all reported issues, their update trails, and votes.
///
/// Shared across the query engine, the stats aggregator, and the vote
/// ledger; nothing caches derived data across calls, so the list, map,
/// and stats views always read the same state.
#[derive(Debug, Default)]
pub struct IssueStore {
    issues: RwLock<HashMap<IssueId, Issue>>,
    updates: RwLock<Vec<IssueUpdate>>,
    votes: RwLock<HashSet<Vote>>,
}

impl IssueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a newly created issue.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if an issue with the same ID
    /// already exists (should never happen with UUID v4).
    pub async fn insert(&self, issue: Issue) -> Result<IssueId, GatewayError> {
        let issue_id = issue.id;
        let mut map = self.issues.write().await;
        if map.contains_key(&issue_id) {
            return Err(GatewayError::Internal(format!(
                "issue {issue_id} already exists"
            )));
        }
        map.insert(issue_id, issue);
        Ok(issue_id)
    }

    /// Returns a snapshot of a single issue.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no issue with the given ID
    /// exists.
    pub async fn get(&self, issue_id: IssueId) -> Result<Issue, GatewayError> {
        let map = self.issues.read().await;
        map.get(&issue_id)
            .cloned()
            .ok_or(GatewayError::NotFound(*issue_id.as_uuid()))
    }

    /// Returns a snapshot of every issue in the store.
    pub async fn list_all(&self) -> Vec<Issue> {
        self.issues.read().await.values().cloned().collect()
    }

    /// Applies a status transition and appends the audit trail entry.
    ///
    /// The current status is re-read under the write lock, so a
    /// concurrently applied transition surfaces as
    /// [`GatewayError::InvalidTransition`] instead of being silently
    /// overwritten. Entering `resolved` stamps `resolved_at`; leaving it
    /// clears the stamp.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown issue and
    /// [`GatewayError::InvalidTransition`] when `new_status` is not
    /// reachable from the current status.
    pub async fn transition(
        &self,
        issue_id: IssueId,
        new_status: Status,
        comment: Option<String>,
        author_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Issue, GatewayError> {
        let mut map = self.issues.write().await;
        let issue = map
            .get_mut(&issue_id)
            .ok_or(GatewayError::NotFound(*issue_id.as_uuid()))?;

        if !issue.status.can_transition_to(new_status) {
            return Err(GatewayError::InvalidTransition {
                from: issue.status,
                to: new_status,
            });
        }

        let leaving_resolved = issue.status == Status::Resolved;
        issue.status = new_status;
        issue.updated_at = now;
        if new_status == Status::Resolved {
            issue.resolved_at = Some(now);
        } else if leaving_resolved {
            issue.resolved_at = None;
        }
        let snapshot = issue.clone();

        // Append while still holding the issue lock so trail order matches
        // the order transitions were applied.
        self.updates.write().await.push(IssueUpdate {
            issue_id,
            status: new_status,
            comment,
            author_id,
            created_at: now,
            is_public: true,
        });

        Ok(snapshot)
    }

    /// Appends an audit entry carrying the issue's current status, without
    /// changing the status. Allowed in every status, terminal included.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no issue with the given ID
    /// exists.
    pub async fn annotate(
        &self,
        issue_id: IssueId,
        comment: String,
        is_public: bool,
        author_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<IssueUpdate, GatewayError> {
        let map = self.issues.read().await;
        let issue = map
            .get(&issue_id)
            .ok_or(GatewayError::NotFound(*issue_id.as_uuid()))?;

        let update = IssueUpdate {
            issue_id,
            status: issue.status,
            comment: Some(comment),
            author_id,
            created_at: now,
            is_public,
        };
        self.updates.write().await.push(update.clone());
        Ok(update)
    }

    /// Returns the update trail for one issue, in append order.
    pub async fn updates_for(&self, issue_id: IssueId) -> Vec<IssueUpdate> {
        self.updates
            .read()
            .await
            .iter()
            .filter(|u| u.issue_id == issue_id)
            .cloned()
            .collect()
    }

    /// Toggles a vote for the `(issue, user, kind)` triple.
    ///
    /// Runs entirely under the ledger's write lock: presence of the row
    /// means the vote is "on", a second identical call removes it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the issue does not exist.
    pub async fn toggle_vote(
        &self,
        issue_id: IssueId,
        user_id: Uuid,
        kind: VoteKind,
    ) -> Result<ToggleAction, GatewayError> {
        if !self.issues.read().await.contains_key(&issue_id) {
            return Err(GatewayError::NotFound(*issue_id.as_uuid()));
        }

        let vote = Vote {
            issue_id,
            user_id,
            kind,
        };
        let mut votes = self.votes.write().await;
        if votes.remove(&vote) {
            Ok(ToggleAction::Removed)
        } else {
            votes.insert(vote);
            Ok(ToggleAction::Added)
        }
    }

    /// Returns current vote tallies for one issue, counted from the live
    /// row set at read time.
    pub async fn vote_counts(&self, issue_id: IssueId) -> VoteCounts {
        let votes = self.votes.read().await;
        let mut counts = VoteCounts::default();
        for vote in votes.iter().filter(|v| v.issue_id == issue_id) {
            match vote.kind {
                VoteKind::Upvote => counts.upvotes += 1,
                VoteKind::Important => counts.important += 1,
            }
        }
        counts
    }

    /// Returns upvote tallies for every issue, used as the `most_voted`
    /// sort key by the query engine.
    pub async fn upvote_counts(&self) -> HashMap<IssueId, u64> {
        let votes = self.votes.read().await;
        let mut counts: HashMap<IssueId, u64> = HashMap::new();
        for vote in votes.iter().filter(|v| v.kind == VoteKind::Upvote) {
            *counts.entry(vote.issue_id).or_default() += 1;
        }
        counts
    }

    /// Re-inserts a vote row loaded from durable storage. Duplicate rows
    /// are ignored.
    pub async fn restore_vote(&self, vote: Vote) {
        self.votes.write().await.insert(vote);
    }

    /// Re-appends an update row loaded from durable storage.
    pub async fn restore_update(&self, update: IssueUpdate) {
        self.updates.write().await.push(update);
    }

    /// Returns the number of issues in the store.
    pub async fn len(&self) -> usize {
        self.issues.read().await.len()
    }

    /// Returns `true` if the store contains no issues.
    pub async fn is_empty(&self) -> bool {
        self.issues.read().await.is_empty()
    }
}
