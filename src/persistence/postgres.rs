//! PostgreSQL implementation of the persistence layer.
//!
//! Durable mirror of the in-memory store: issues and their update trails
//! are written through on every mutation and loaded back at startup. The
//! `votes` table carries a composite primary key on
//! `(issue_id, user_id, kind)`; [`PostgresPersistence::toggle_vote`]
//! relies on that constraint and translates an insert conflict into the
//! toggle's remove branch instead of serializing the race in application
//! logic.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::issue::{Issue, IssueUpdate};
use crate::domain::vote::{ToggleAction, Vote, VoteKind};
use crate::domain::IssueId;
use crate::error::GatewayError;
use crate::persistence::models::{IssueRow, IssueUpdateRow, VoteRow};

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a newly created issue.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn insert_issue(&self, issue: &Issue) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO issues (id, title, description, category, priority, status, address, \
             lat, lng, reporter_id, contact_name, contact_email, contact_phone, \
             created_at, updated_at, resolved_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(issue.id.as_uuid())
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(issue.category.as_str())
        .bind(issue.priority.as_str())
        .bind(issue.status.as_str())
        .bind(&issue.address)
        .bind(issue.coordinates.map(|c| c.lat))
        .bind(issue.coordinates.map(|c| c.lng))
        .bind(issue.reporter_id)
        .bind(issue.reporter_contact.as_ref().map(|c| c.name.as_str()))
        .bind(issue.reporter_contact.as_ref().map(|c| c.email.as_str()))
        .bind(issue.reporter_contact.as_ref().map(|c| c.phone.as_str()))
        .bind(issue.created_at)
        .bind(issue.updated_at)
        .bind(issue.resolved_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Writes the status fields after a lifecycle transition.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn update_issue_status(&self, issue: &Issue) -> Result<(), GatewayError> {
        sqlx::query(
            "UPDATE issues SET status = $2, updated_at = $3, resolved_at = $4 WHERE id = $1",
        )
        .bind(issue.id.as_uuid())
        .bind(issue.status.as_str())
        .bind(issue.updated_at)
        .bind(issue.resolved_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Appends an update-trail entry.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn append_update(&self, update: &IssueUpdate) -> Result<i64, GatewayError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO issue_updates (issue_id, status, comment, author_id, created_at, is_public) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(update.issue_id.as_uuid())
        .bind(update.status.as_str())
        .bind(update.comment.as_deref())
        .bind(update.author_id)
        .bind(update.created_at)
        .bind(update.is_public)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(id)
    }

    /// Toggles a vote row under the table's uniqueness constraint.
    ///
    /// Attempts an insert with `ON CONFLICT DO NOTHING`; zero affected
    /// rows means the triple already existed (possibly inserted by a
    /// concurrent request), so the row is deleted instead — the race is
    /// treated as "vote already existed, remove it" rather than surfaced
    /// as a storage error.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn toggle_vote(
        &self,
        issue_id: IssueId,
        user_id: Uuid,
        kind: VoteKind,
    ) -> Result<ToggleAction, GatewayError> {
        let inserted = sqlx::query(
            "INSERT INTO votes (issue_id, user_id, kind) VALUES ($1, $2, $3) \
             ON CONFLICT (issue_id, user_id, kind) DO NOTHING",
        )
        .bind(issue_id.as_uuid())
        .bind(user_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        if inserted.rows_affected() > 0 {
            return Ok(ToggleAction::Added);
        }

        sqlx::query("DELETE FROM votes WHERE issue_id = $1 AND user_id = $2 AND kind = $3")
            .bind(issue_id.as_uuid())
            .bind(user_id)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(ToggleAction::Removed)
    }

    /// Loads every issue for startup hydration of the in-memory store.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// an unparseable discriminator.
    pub async fn load_issues(&self) -> Result<Vec<Issue>, GatewayError> {
        let rows = sqlx::query_as::<_, IssueRow>(
            "SELECT id, title, description, category, priority, status, address, \
             lat, lng, reporter_id, contact_name, contact_email, contact_phone, \
             created_at, updated_at, resolved_at FROM issues ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        rows.into_iter().map(Issue::try_from).collect()
    }

    /// Loads every update-trail entry in append order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// an unparseable discriminator.
    pub async fn load_updates(&self) -> Result<Vec<IssueUpdate>, GatewayError> {
        let rows = sqlx::query_as::<_, IssueUpdateRow>(
            "SELECT id, issue_id, status, comment, author_id, created_at, is_public \
             FROM issue_updates ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        rows.into_iter().map(IssueUpdate::try_from).collect()
    }

    /// Loads every vote row.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// an unparseable discriminator.
    pub async fn load_votes(&self) -> Result<Vec<Vote>, GatewayError> {
        let rows =
            sqlx::query_as::<_, VoteRow>("SELECT issue_id, user_id, kind FROM votes")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        rows.into_iter().map(Vote::try_from).collect()
    }
}
