//! Issue-related DTOs: submission, query parameters, and responses.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common_dto::PaginationMeta;
use crate::domain::geo::Coordinates;
use crate::domain::issue::{Category, Issue, IssueUpdate, NewIssue, Priority, ReporterContact};
use crate::domain::query::{QueryParams, QueryResult, SortBy, TimeRange};
use crate::domain::status::Status;
use crate::domain::IssueId;
use crate::error::GatewayError;

/// Request body for `POST /issues`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateIssueRequest {
    /// Short headline.
    pub title: String,
    /// Full description of the problem.
    pub description: String,
    /// Category string (e.g. `"roads"`).
    pub category: String,
    /// Optional priority string; defaults to `"medium"`.
    #[serde(default)]
    pub priority: Option<String>,
    /// Street address; required unless coordinates are given.
    #[serde(default)]
    pub address: String,
    /// Latitude; must be paired with `lng`.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude; must be paired with `lat`.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Authenticated reporter ID, if signed in.
    #[serde(default)]
    pub reporter_id: Option<Uuid>,
    /// Contact details; required for anonymous submissions.
    #[serde(default)]
    pub reporter_contact: Option<ReporterContactDto>,
}

/// Contact details carried on anonymous submissions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReporterContactDto {
    /// Reporter's name.
    pub name: String,
    /// Reporter's email address.
    pub email: String,
    /// Reporter's phone number.
    pub phone: String,
}

impl From<CreateIssueRequest> for NewIssue {
    fn from(req: CreateIssueRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            priority: req.priority,
            address: req.address,
            lat: req.lat,
            lng: req.lng,
            reporter_id: req.reporter_id,
            reporter_contact: req.reporter_contact.map(|c| ReporterContact {
                name: c.name,
                email: c.email,
                phone: c.phone,
            }),
        }
    }
}

/// Query string parameters for `GET /issues` and `GET /issues/map`.
///
/// Enum-valued filters arrive as strings and are parsed once here — the
/// single validation point for the whole parameter set. `"all"` means
/// the filter is skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueQueryDto {
    /// Category filter; absent or `"all"` skips it.
    #[serde(default)]
    pub category: Option<String>,
    /// Status filter; absent or `"all"` skips it.
    #[serde(default)]
    pub status: Option<String>,
    /// Priority filter; absent or `"all"` skips it.
    #[serde(default)]
    pub priority: Option<String>,
    /// Trailing time window: `all`, `24h`, `7d`, `30d`, or `90d`.
    #[serde(default)]
    pub time_range: Option<String>,
    /// Case-insensitive substring search.
    #[serde(default)]
    pub search: Option<String>,
    /// Radius search center latitude; paired with `lng`.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Radius search center longitude; paired with `lat`.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Radius search distance in kilometers.
    #[serde(default)]
    pub radius_km: Option<f64>,
    /// Sort order: `newest`, `oldest`, `status`, `priority`, `most_voted`.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> i64 {
    20
}

/// Parses `raw` unless it is absent or the `"all"` sentinel, collecting
/// the field name on failure.
fn parse_filter<T: FromStr>(raw: Option<&str>, field: &str, fields: &mut Vec<String>) -> Option<T> {
    let raw = raw.filter(|s| !s.is_empty() && *s != "all")?;
    match T::from_str(raw) {
        Ok(value) => Some(value),
        Err(_) => {
            fields.push(field.to_string());
            None
        }
    }
}

impl IssueQueryDto {
    /// Converts the raw query string into validated [`QueryParams`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] naming every unparseable
    /// parameter, or [`GatewayError::InvalidCoordinate`] for a non-finite
    /// center.
    pub fn into_params(self) -> Result<QueryParams, GatewayError> {
        let mut fields = Vec::new();

        let category = parse_filter::<Category>(self.category.as_deref(), "category", &mut fields);
        let status = parse_filter::<Status>(self.status.as_deref(), "status", &mut fields);
        let priority = parse_filter::<Priority>(self.priority.as_deref(), "priority", &mut fields);
        let time_range =
            parse_filter::<TimeRange>(self.time_range.as_deref(), "time_range", &mut fields)
                .unwrap_or_default();
        let sort_by = parse_filter::<SortBy>(self.sort_by.as_deref(), "sort_by", &mut fields)
            .unwrap_or_default();

        let center = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)?),
            (None, None) => None,
            _ => {
                fields.push("center".to_string());
                None
            }
        };

        if !fields.is_empty() {
            return Err(GatewayError::Validation { fields });
        }

        Ok(QueryParams {
            category,
            status,
            priority,
            time_range,
            search: self.search,
            center,
            radius_km: self.radius_km,
            sort_by,
            page: self.page,
            // Upper bound guards the response size; the engine rejects
            // non-positive values with InvalidPageSize.
            page_size: self.per_page.min(100),
            require_coordinates: false,
        })
    }
}

/// Issue representation in API responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssueDto {
    /// Issue identifier.
    pub id: IssueId,
    /// Short headline.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Category discriminator.
    pub category: Category,
    /// Priority discriminator.
    pub priority: Priority,
    /// Current lifecycle status.
    pub status: Status,
    /// Street address.
    pub address: String,
    /// Latitude, when located.
    pub lat: Option<f64>,
    /// Longitude, when located.
    pub lng: Option<f64>,
    /// Authenticated reporter, if any.
    pub reporter_id: Option<Uuid>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Resolution timestamp; set iff status is `resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<Issue> for IssueDto {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id,
            title: issue.title,
            description: issue.description,
            category: issue.category,
            priority: issue.priority,
            status: issue.status,
            address: issue.address,
            lat: issue.coordinates.map(|c| c.lat),
            lng: issue.coordinates.map(|c| c.lng),
            reporter_id: issue.reporter_id,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            resolved_at: issue.resolved_at,
        }
    }
}

/// Paginated list response for `GET /issues` and `GET /issues/map`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueListResponse {
    /// Issues on the requested page, in sort order.
    pub data: Vec<IssueDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

impl IssueListResponse {
    /// Builds the response from a query result and the echoed paging
    /// parameters.
    #[must_use]
    pub fn from_result(result: QueryResult, page: u32, per_page: i64) -> Self {
        Self {
            data: result.items.into_iter().map(IssueDto::from).collect(),
            pagination: PaginationMeta {
                page,
                per_page,
                total: result.total_count,
                total_pages: result.total_pages,
            },
        }
    }
}

/// One audit-trail entry in API responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssueUpdateDto {
    /// Issue the entry belongs to.
    pub issue_id: IssueId,
    /// Status at the time of the entry.
    pub status: Status,
    /// Optional staff comment.
    pub comment: Option<String>,
    /// Authoring staff member.
    pub author_id: Uuid,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
    /// Whether the entry is citizen-visible.
    pub is_public: bool,
}

impl From<IssueUpdate> for IssueUpdateDto {
    fn from(update: IssueUpdate) -> Self {
        Self {
            issue_id: update.issue_id,
            status: update.status,
            comment: update.comment,
            author_id: update.author_id,
            created_at: update.created_at,
            is_public: update.is_public,
        }
    }
}

/// Detail response for `GET /issues/:id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueDetailResponse {
    /// The issue itself.
    pub issue: IssueDto,
    /// Current vote tallies.
    pub votes: super::vote_dto::VoteCountsDto,
    /// Citizen-visible update trail in append order.
    pub updates: Vec<IssueUpdateDto>,
}

/// Request body for `POST /issues/:id/transition`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target status string (e.g. `"in_review"`).
    pub status: String,
    /// Optional comment recorded on the trail entry.
    #[serde(default)]
    pub comment: Option<String>,
    /// Staff member applying the transition. Identity is explicit; role
    /// checks belong to the caller.
    pub author_id: Uuid,
}

/// Request body for `POST /issues/:id/annotations`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnnotateRequest {
    /// Comment text.
    pub comment: String,
    /// Whether the entry is citizen-visible. Defaults to `true`.
    #[serde(default = "default_is_public")]
    pub is_public: bool,
    /// Staff member authoring the annotation.
    pub author_id: Uuid,
}

fn default_is_public() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn empty_query() -> IssueQueryDto {
        IssueQueryDto {
            category: None,
            status: None,
            priority: None,
            time_range: None,
            search: None,
            lat: None,
            lng: None,
            radius_km: None,
            sort_by: None,
            page: default_page(),
            per_page: default_per_page(),
        }
    }

    #[test]
    fn defaults_produce_default_params() {
        let Ok(params) = empty_query().into_params() else {
            panic!("conversion failed");
        };
        assert!(params.category.is_none());
        assert_eq!(params.time_range, TimeRange::All);
        assert_eq!(params.sort_by, SortBy::Newest);
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 20);
        assert!(!params.require_coordinates);
    }

    #[test]
    fn all_sentinel_skips_filters() {
        let dto = IssueQueryDto {
            category: Some("all".to_string()),
            status: Some("all".to_string()),
            ..empty_query()
        };
        let Ok(params) = dto.into_params() else {
            panic!("conversion failed");
        };
        assert!(params.category.is_none());
        assert!(params.status.is_none());
    }

    #[test]
    fn unknown_filter_values_are_collected() {
        let dto = IssueQueryDto {
            category: Some("volcanoes".to_string()),
            sort_by: Some("loudest".to_string()),
            ..empty_query()
        };
        let Err(GatewayError::Validation { fields }) = dto.into_params() else {
            panic!("expected validation error");
        };
        assert!(fields.contains(&"category".to_string()));
        assert!(fields.contains(&"sort_by".to_string()));
    }

    #[test]
    fn partial_center_is_rejected() {
        let dto = IssueQueryDto {
            lat: Some(40.0),
            ..empty_query()
        };
        let Err(GatewayError::Validation { fields }) = dto.into_params() else {
            panic!("expected validation error");
        };
        assert_eq!(fields, vec!["center".to_string()]);
    }

    #[test]
    fn per_page_is_capped_at_100() {
        let dto = IssueQueryDto {
            per_page: 5000,
            ..empty_query()
        };
        let Ok(params) = dto.into_params() else {
            panic!("conversion failed");
        };
        assert_eq!(params.page_size, 100);
    }

    #[test]
    fn non_positive_per_page_passes_through_for_engine_rejection() {
        let dto = IssueQueryDto {
            per_page: 0,
            ..empty_query()
        };
        let Ok(params) = dto.into_params() else {
            panic!("conversion failed");
        };
        assert_eq!(params.page_size, 0);
    }
}
