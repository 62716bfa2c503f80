//! Database row models for issues, update-trail entries, and votes.
//!
//! Enum discriminators travel as text and are parsed back into domain
//! types on load; corruption surfaces as a persistence error, never a
//! panic.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::geo::Coordinates;
use crate::domain::issue::{Category, Issue, IssueUpdate, Priority, ReporterContact};
use crate::domain::status::Status;
use crate::domain::vote::{Vote, VoteKind};
use crate::domain::IssueId;
use crate::error::GatewayError;

/// An issue row from the `issues` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IssueRow {
    /// Issue UUID (primary key).
    pub id: Uuid,
    /// Short headline.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Category discriminator (e.g. `"roads"`).
    pub category: String,
    /// Priority discriminator (e.g. `"medium"`).
    pub priority: String,
    /// Status discriminator (e.g. `"submitted"`).
    pub status: String,
    /// Street address (may be empty when coordinates are present).
    pub address: String,
    /// Latitude; NULL together with `lng` or not at all (CHECK constraint).
    pub lat: Option<f64>,
    /// Longitude; NULL together with `lat` or not at all.
    pub lng: Option<f64>,
    /// Authenticated reporter, if any.
    pub reporter_id: Option<Uuid>,
    /// Anonymous reporter name.
    pub contact_name: Option<String>,
    /// Anonymous reporter email.
    pub contact_email: Option<String>,
    /// Anonymous reporter phone.
    pub contact_phone: Option<String>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Set iff status is `resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<IssueRow> for Issue {
    type Error = GatewayError;

    fn try_from(row: IssueRow) -> Result<Self, Self::Error> {
        let coordinates = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)?),
            (None, None) => None,
            _ => {
                return Err(GatewayError::PersistenceError(format!(
                    "issue {} has a partial coordinate pair",
                    row.id
                )));
            }
        };

        let reporter_contact = match (row.contact_name, row.contact_email, row.contact_phone) {
            (Some(name), Some(email), Some(phone)) => Some(ReporterContact { name, email, phone }),
            _ => None,
        };

        Ok(Self {
            id: IssueId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            category: parse_discriminator::<Category>(&row.category, "category")?,
            priority: parse_discriminator::<Priority>(&row.priority, "priority")?,
            status: parse_discriminator::<Status>(&row.status, "status")?,
            address: row.address,
            coordinates,
            reporter_id: row.reporter_id,
            reporter_contact,
            created_at: row.created_at,
            updated_at: row.updated_at,
            resolved_at: row.resolved_at,
        })
    }
}

/// An update-trail row from the `issue_updates` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IssueUpdateRow {
    /// Auto-increment row ID.
    pub id: i64,
    /// Issue the entry belongs to.
    pub issue_id: Uuid,
    /// Status discriminator at the time of the entry.
    pub status: String,
    /// Optional staff comment.
    pub comment: Option<String>,
    /// Authoring staff member.
    pub author_id: Uuid,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the entry is citizen-visible.
    pub is_public: bool,
}

impl TryFrom<IssueUpdateRow> for IssueUpdate {
    type Error = GatewayError;

    fn try_from(row: IssueUpdateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            issue_id: IssueId::from_uuid(row.issue_id),
            status: parse_discriminator::<Status>(&row.status, "status")?,
            comment: row.comment,
            author_id: row.author_id,
            created_at: row.created_at,
            is_public: row.is_public,
        })
    }
}

/// A vote row from the `votes` table. The table carries a composite
/// primary key on `(issue_id, user_id, kind)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VoteRow {
    /// Issue being endorsed.
    pub issue_id: Uuid,
    /// Voting user.
    pub user_id: Uuid,
    /// Vote kind discriminator (e.g. `"upvote"`).
    pub kind: String,
}

impl TryFrom<VoteRow> for Vote {
    type Error = GatewayError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            issue_id: IssueId::from_uuid(row.issue_id),
            user_id: row.user_id,
            kind: parse_discriminator::<VoteKind>(&row.kind, "vote kind")?,
        })
    }
}

/// Parses a stored enum discriminator, surfacing corruption as a
/// persistence error.
fn parse_discriminator<T: FromStr>(raw: &str, what: &str) -> Result<T, GatewayError> {
    T::from_str(raw)
        .map_err(|_| GatewayError::PersistenceError(format!("stored {what} is invalid: {raw}")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn base_row() -> IssueRow {
        IssueRow {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            category: "roads".to_string(),
            priority: "high".to_string(),
            status: "submitted".to_string(),
            address: "a".to_string(),
            lat: None,
            lng: None,
            reporter_id: Some(Uuid::new_v4()),
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn row_converts_to_domain_issue() {
        let Ok(issue) = Issue::try_from(base_row()) else {
            panic!("conversion failed");
        };
        assert_eq!(issue.category, Category::Roads);
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(issue.status, Status::Submitted);
        assert!(issue.coordinates.is_none());
    }

    #[test]
    fn partial_coordinate_pair_is_a_persistence_error() {
        let row = IssueRow {
            lat: Some(40.0),
            ..base_row()
        };
        let result = Issue::try_from(row);
        assert!(matches!(result, Err(GatewayError::PersistenceError(_))));
    }

    #[test]
    fn corrupt_discriminator_is_a_persistence_error() {
        let row = IssueRow {
            status: "lost".to_string(),
            ..base_row()
        };
        let result = Issue::try_from(row);
        assert!(matches!(result, Err(GatewayError::PersistenceError(_))));
    }
}
