//! Issue aggregate: category and priority taxonomies, the issue record
//! itself, its append-only update trail, and submission validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::IssueId;
use super::geo::Coordinates;
use super::status::Status;
use crate::error::GatewayError;

/// Kind of civic problem being reported.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Potholes, road damage, signage.
    Roads,
    /// Garbage collection, illegal dumping.
    Sanitation,
    /// Water, power, gas, telecom faults.
    Utilities,
    /// Public buildings, bridges, sidewalks.
    Infrastructure,
    /// Street lighting, hazards, traffic safety.
    Safety,
    /// Parks, trees, pollution.
    Environment,
    /// Anything that fits nowhere else.
    Other,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Roads,
        Self::Sanitation,
        Self::Utilities,
        Self::Infrastructure,
        Self::Safety,
        Self::Environment,
        Self::Other,
    ];

    /// Wire string for this category (matches the serde representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roads => "roads",
            Self::Sanitation => "sanitation",
            Self::Utilities => "utilities",
            Self::Infrastructure => "infrastructure",
            Self::Safety => "safety",
            Self::Environment => "environment",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roads" => Ok(Self::Roads),
            "sanitation" => Ok(Self::Sanitation),
            "utilities" => Ok(Self::Utilities),
            "infrastructure" => Ok(Self::Infrastructure),
            "safety" => Ok(Self::Safety),
            "environment" => Ok(Self::Environment),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Urgency of a reported issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Cosmetic or low-impact.
    Low,
    /// Default for new submissions.
    Medium,
    /// Significant disruption.
    High,
    /// Danger to life or property.
    Critical,
}

impl Priority {
    /// All priorities from least to most severe.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Severity rank: `critical > high > medium > low`. Used by the query
    /// engine's `priority` sort.
    #[must_use]
    pub const fn severity_rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }

    /// Wire string for this priority (matches the serde representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Contact details for anonymous reporters.
///
/// Required, fully populated, whenever a submission carries no
/// `reporter_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterContact {
    /// Reporter's name.
    pub name: String,
    /// Reporter's email address (syntactically validated).
    pub email: String,
    /// Reporter's phone number.
    pub phone: String,
}

/// A single reported civic issue and its full lifecycle record.
///
/// Created by a citizen submission; mutated only through lifecycle
/// transitions and vote recomputation; never physically deleted (terminal
/// statuses are retained for audit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Unique issue identifier (immutable after creation).
    pub id: IssueId,
    /// Short headline.
    pub title: String,
    /// Full description of the problem.
    pub description: String,
    /// Problem taxonomy.
    pub category: Category,
    /// Urgency, defaulting to medium on submission.
    pub priority: Priority,
    /// Current lifecycle status.
    pub status: Status,
    /// Free-form street address. May be empty when coordinates are given.
    pub address: String,
    /// GPS position. Fully present or fully absent, never partial.
    pub coordinates: Option<Coordinates>,
    /// Authenticated reporter, if any (anonymous reporting is allowed).
    pub reporter_id: Option<Uuid>,
    /// Contact details; required when `reporter_id` is absent.
    pub reporter_contact: Option<ReporterContact>,
    /// Submission timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last lifecycle mutation.
    pub updated_at: DateTime<Utc>,
    /// Set iff `status == resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
}

/// One entry in an issue's append-only audit trail.
///
/// Created only as a side effect of a lifecycle transition or an explicit
/// annotate call; owned exclusively by the issue it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueUpdate {
    /// Issue this entry belongs to.
    pub issue_id: IssueId,
    /// Status the issue held at the time of this entry.
    pub status: Status,
    /// Optional staff comment.
    pub comment: Option<String>,
    /// Staff member who authored the entry.
    pub author_id: Uuid,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the entry is visible to the reporting citizen.
    pub is_public: bool,
}

/// Raw citizen submission, prior to validation.
///
/// Category and priority arrive as strings so that validation can report
/// every invalid field in one pass instead of failing at deserialization.
#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    /// Short headline. Must be non-empty.
    pub title: String,
    /// Full description. Must be non-empty.
    pub description: String,
    /// Category string, parsed against [`Category`].
    pub category: String,
    /// Optional priority string, parsed against [`Priority`].
    pub priority: Option<String>,
    /// Street address. Required unless coordinates are present.
    pub address: String,
    /// Latitude. Must be paired with `lng`.
    pub lat: Option<f64>,
    /// Longitude. Must be paired with `lat`.
    pub lng: Option<f64>,
    /// Authenticated reporter, if any.
    pub reporter_id: Option<Uuid>,
    /// Contact details; required when `reporter_id` is absent.
    pub reporter_contact: Option<ReporterContact>,
}

impl NewIssue {
    /// Validates the submission and builds the issue in `submitted` status.
    ///
    /// All checks run before any field is accepted so the resulting error
    /// names every invalid field at once.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] listing every invalid field.
    pub fn into_issue(self, now: DateTime<Utc>) -> Result<Issue, GatewayError> {
        let mut fields = Vec::new();

        if self.title.trim().is_empty() {
            fields.push("title".to_string());
        }
        if self.description.trim().is_empty() {
            fields.push("description".to_string());
        }

        let category = match Category::from_str(&self.category) {
            Ok(c) => Some(c),
            Err(_) => {
                fields.push("category".to_string());
                None
            }
        };

        let priority = match self.priority.as_deref() {
            None => Some(Priority::Medium),
            Some(raw) => match Priority::from_str(raw) {
                Ok(p) => Some(p),
                Err(_) => {
                    fields.push("priority".to_string());
                    None
                }
            },
        };

        let coordinates = match (self.lat, self.lng) {
            (None, None) => None,
            (Some(lat), Some(lng)) => match Coordinates::new(lat, lng) {
                Ok(c) => Some(c),
                Err(_) => {
                    fields.push("coordinates".to_string());
                    None
                }
            },
            // Partial pairs are never accepted.
            _ => {
                fields.push("coordinates".to_string());
                None
            }
        };

        if self.address.trim().is_empty() && coordinates.is_none() {
            fields.push("address".to_string());
        }

        if self.reporter_id.is_none() {
            match &self.reporter_contact {
                None => fields.push("reporter_contact".to_string()),
                Some(contact) => {
                    if contact.name.trim().is_empty() {
                        fields.push("reporter_contact.name".to_string());
                    }
                    if !is_valid_email(&contact.email) {
                        fields.push("reporter_contact.email".to_string());
                    }
                    if contact.phone.trim().is_empty() {
                        fields.push("reporter_contact.phone".to_string());
                    }
                }
            }
        }

        if !fields.is_empty() {
            return Err(GatewayError::Validation { fields });
        }

        Ok(Issue {
            id: IssueId::new(),
            title: self.title,
            description: self.description,
            category: category.unwrap_or(Category::Other),
            priority: priority.unwrap_or(Priority::Medium),
            status: Status::Submitted,
            address: self.address,
            coordinates,
            reporter_id: self.reporter_id,
            reporter_contact: self.reporter_contact,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        })
    }
}

/// Syntactic email check: one `@`, non-empty local part, and a domain
/// containing a dot with non-empty labels. No delivery verification.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
