//! Query engine: one ordered, filtered, paginated view of the issue set.
//!
//! Consumed identically by the list and the map endpoints so the two can
//! never disagree on what matches the current filters. Filtering runs as
//! a fixed pipeline, each stage narrowing the previous and bailing out
//! early once nothing is left.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::IssueId;
use super::geo::{self, Coordinates};
use super::issue::{Category, Issue, Priority};
use super::status::Status;
use crate::error::GatewayError;

/// Trailing time window applied to `created_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    /// No time filtering.
    #[default]
    #[serde(rename = "all")]
    All,
    /// Trailing 24 hours.
    #[serde(rename = "24h")]
    Day,
    /// Trailing 7 days.
    #[serde(rename = "7d")]
    Week,
    /// Trailing 30 days.
    #[serde(rename = "30d")]
    Month,
    /// Trailing 90 days.
    #[serde(rename = "90d")]
    Quarter,
}

impl TimeRange {
    /// Length of the trailing window, or `None` for [`TimeRange::All`].
    #[must_use]
    pub fn window(self) -> Option<Duration> {
        match self {
            Self::All => None,
            Self::Day => Some(Duration::hours(24)),
            Self::Week => Some(Duration::days(7)),
            Self::Month => Some(Duration::days(30)),
            Self::Quarter => Some(Duration::days(90)),
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "24h" => Ok(Self::Day),
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            other => Err(format!("unknown time range: {other}")),
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Most recently created first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Lifecycle graph order (not alphabetical).
    Status,
    /// Severity rank, `critical` first.
    Priority,
    /// Upvote count descending, newest first on ties.
    MostVoted,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "most_voted" => Ok(Self::MostVoted),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// One explicit, fully defaulted parameter set for issue queries.
///
/// Validated once at the boundary instead of read ad hoc from loose
/// option bags.
#[derive(Debug, Clone)]
pub struct QueryParams {
    /// Exact-match category filter.
    pub category: Option<Category>,
    /// Exact-match status filter.
    pub status: Option<Status>,
    /// Exact-match priority filter.
    pub priority: Option<Priority>,
    /// Trailing window on `created_at`.
    pub time_range: TimeRange,
    /// Case-insensitive substring matched against title, description, and
    /// address; an issue matches if any of the three contains it.
    pub search: Option<String>,
    /// Radius filter center. Only applied together with `radius_km`.
    pub center: Option<Coordinates>,
    /// Radius filter distance in kilometers.
    pub radius_km: Option<f64>,
    /// Result ordering.
    pub sort_by: SortBy,
    /// Page number, 1-indexed. A page past the end is an empty page.
    pub page: u32,
    /// Items per page; must be positive.
    pub page_size: i64,
    /// Map-view flag: unconditionally drop issues without coordinates as
    /// the final stage. The list view leaves this off.
    pub require_coordinates: bool,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            category: None,
            status: None,
            priority: None,
            time_range: TimeRange::All,
            search: None,
            center: None,
            radius_km: None,
            sort_by: SortBy::Newest,
            page: 1,
            page_size: 20,
            require_coordinates: false,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Issues on the requested page, in sort order.
    pub items: Vec<Issue>,
    /// Number of matches after filtering, before pagination.
    pub total_count: u64,
    /// Number of pages at the requested page size.
    pub total_pages: u32,
}

impl QueryResult {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
        }
    }
}

/// Filters, sorts, and paginates `issues` according to `params`.
///
/// `upvotes` supplies the `most_voted` sort key; `now` anchors the time
/// window. Deterministic for fixed inputs.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidPageSize`] when `page_size <= 0` and
/// [`GatewayError::InvalidCoordinate`] when the radius is not finite.
pub fn query(
    issues: Vec<Issue>,
    upvotes: &HashMap<IssueId, u64>,
    params: &QueryParams,
    now: DateTime<Utc>,
) -> Result<QueryResult, GatewayError> {
    if params.page_size <= 0 {
        return Err(GatewayError::InvalidPageSize(params.page_size));
    }

    // Stage 1: exact-match filters.
    let mut matched = issues;
    if params.category.is_some() || params.status.is_some() || params.priority.is_some() {
        matched.retain(|issue| {
            params.category.is_none_or(|c| issue.category == c)
                && params.status.is_none_or(|s| issue.status == s)
                && params.priority.is_none_or(|p| issue.priority == p)
        });
        if matched.is_empty() {
            return Ok(QueryResult::empty());
        }
    }

    // Stage 2: trailing time window.
    if let Some(window) = params.time_range.window() {
        let cutoff = now - window;
        matched.retain(|issue| issue.created_at >= cutoff && issue.created_at <= now);
        if matched.is_empty() {
            return Ok(QueryResult::empty());
        }
    }

    // Stage 3: free-text search over title, description, and address.
    if let Some(needle) = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let needle = needle.to_lowercase();
        matched.retain(|issue| {
            issue.title.to_lowercase().contains(&needle)
                || issue.description.to_lowercase().contains(&needle)
                || issue.address.to_lowercase().contains(&needle)
        });
        if matched.is_empty() {
            return Ok(QueryResult::empty());
        }
    }

    // Stage 4: radius filter. Issues without coordinates fail closed.
    if let (Some(center), Some(radius_km)) = (params.center, params.radius_km) {
        let mut in_radius = Vec::with_capacity(matched.len());
        for issue in matched {
            let Some(point) = issue.coordinates else {
                continue;
            };
            if geo::within_radius(center, radius_km, point)? {
                in_radius.push(issue);
            }
        }
        matched = in_radius;
        if matched.is_empty() {
            return Ok(QueryResult::empty());
        }
    }

    // Stage 5: map view drops coordinate-less issues unconditionally.
    if params.require_coordinates {
        matched.retain(|issue| issue.coordinates.is_some());
    }

    sort_issues(&mut matched, params.sort_by, upvotes);

    let total_count = matched.len() as u64;
    let page_size = params.page_size as u64;
    let total_pages = if total_count == 0 {
        0
    } else {
        u32::try_from(total_count.div_ceil(page_size)).unwrap_or(u32::MAX)
    };

    let page = u64::from(params.page.max(1));
    let start = (page - 1).saturating_mul(page_size);
    let items: Vec<Issue> = matched
        .into_iter()
        .skip(usize::try_from(start).unwrap_or(usize::MAX))
        .take(usize::try_from(page_size).unwrap_or(usize::MAX))
        .collect();

    Ok(QueryResult {
        items,
        total_count,
        total_pages,
    })
}

/// Applies the requested ordering. Every sort breaks ties by descending
/// `created_at` so the output is deterministic for a fixed input set.
fn sort_issues(issues: &mut [Issue], sort_by: SortBy, upvotes: &HashMap<IssueId, u64>) {
    match sort_by {
        SortBy::Newest => issues.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::Oldest => issues.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortBy::Status => issues.sort_by(|a, b| {
            a.status
                .sort_rank()
                .cmp(&b.status.sort_rank())
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
        SortBy::Priority => issues.sort_by(|a, b| {
            b.priority
                .severity_rank()
                .cmp(&a.priority.severity_rank())
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
        SortBy::MostVoted => issues.sort_by(|a, b| {
            let votes_a = upvotes.get(&a.id).copied().unwrap_or(0);
            let votes_b = upvotes.get(&b.id).copied().unwrap_or(0);
            votes_b
                .cmp(&votes_a)
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::IssueId;
    use chrono::TimeZone;

    fn at(hours_ago: i64, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::hours(hours_ago)
    }

    fn make_issue(
        title: &str,
        category: Category,
        status: Status,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Issue {
        Issue {
            id: IssueId::new(),
            title: title.to_string(),
            description: format!("{title} description"),
            category,
            priority,
            status,
            address: "42 Elm St".to_string(),
            coordinates: None,
            reporter_id: None,
            reporter_contact: None,
            created_at,
            updated_at: created_at,
            resolved_at: None,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        let Some(now) = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single() else {
            panic!("valid timestamp");
        };
        now
    }

    fn run(issues: Vec<Issue>, params: &QueryParams) -> QueryResult {
        let Ok(result) = query(issues, &HashMap::new(), params, fixed_now()) else {
            panic!("query failed");
        };
        result
    }

    #[test]
    fn empty_input_yields_empty_page() {
        let result = run(Vec::new(), &QueryParams::default());
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 0);
        assert_eq!(result.total_pages, 0);
    }

    #[test]
    fn exact_match_filters_compose() {
        let now = fixed_now();
        let issues = vec![
            make_issue(
                "pothole",
                Category::Roads,
                Status::Submitted,
                Priority::High,
                at(1, now),
            ),
            make_issue(
                "trash",
                Category::Sanitation,
                Status::Submitted,
                Priority::High,
                at(2, now),
            ),
            make_issue(
                "pothole two",
                Category::Roads,
                Status::Resolved,
                Priority::Low,
                at(3, now),
            ),
        ];
        let params = QueryParams {
            category: Some(Category::Roads),
            status: Some(Status::Submitted),
            ..QueryParams::default()
        };
        let result = run(issues, &params);
        assert_eq!(result.total_count, 1);
        assert_eq!(
            result.items.first().map(|i| i.title.as_str()),
            Some("pothole")
        );
    }

    #[test]
    fn time_range_keeps_only_trailing_window() {
        let now = fixed_now();
        let issues = vec![
            make_issue(
                "recent",
                Category::Other,
                Status::Submitted,
                Priority::Medium,
                at(5, now),
            ),
            make_issue(
                "ancient",
                Category::Other,
                Status::Submitted,
                Priority::Medium,
                at(24 * 40, now),
            ),
        ];
        let params = QueryParams {
            time_range: TimeRange::Month,
            ..QueryParams::default()
        };
        let result = run(issues, &params);
        assert_eq!(result.total_count, 1);
        assert_eq!(
            result.items.first().map(|i| i.title.as_str()),
            Some("recent")
        );
    }

    #[test]
    fn search_matches_any_of_title_description_address() {
        let now = fixed_now();
        let mut by_address = make_issue(
            "quiet title",
            Category::Other,
            Status::Submitted,
            Priority::Medium,
            at(1, now),
        );
        by_address.description = "nothing here".to_string();
        by_address.address = "99 Maple AVENUE".to_string();

        let miss = make_issue(
            "unrelated",
            Category::Other,
            Status::Submitted,
            Priority::Medium,
            at(2, now),
        );

        let params = QueryParams {
            search: Some("maple".to_string()),
            ..QueryParams::default()
        };
        let result = run(vec![by_address, miss], &params);
        assert_eq!(result.total_count, 1);
        assert_eq!(
            result.items.first().map(|i| i.address.as_str()),
            Some("99 Maple AVENUE")
        );
    }

    #[test]
    fn radius_filter_fails_closed_for_missing_coordinates() {
        let now = fixed_now();
        let mut located = make_issue(
            "located",
            Category::Roads,
            Status::Submitted,
            Priority::Medium,
            at(1, now),
        );
        located.coordinates = Coordinates::new(40.0, -74.0).ok();
        let unlocated = make_issue(
            "unlocated",
            Category::Roads,
            Status::Submitted,
            Priority::Medium,
            at(2, now),
        );

        let geo_params = QueryParams {
            center: Coordinates::new(40.0, -74.0).ok(),
            radius_km: Some(5.0),
            ..QueryParams::default()
        };
        let result = run(vec![located.clone(), unlocated.clone()], &geo_params);
        assert_eq!(result.total_count, 1);
        assert_eq!(
            result.items.first().map(|i| i.title.as_str()),
            Some("located")
        );

        // Without the geo filter the list view includes both.
        let result = run(vec![located, unlocated], &QueryParams::default());
        assert_eq!(result.total_count, 2);
    }

    #[test]
    fn center_without_radius_is_a_no_op() {
        let now = fixed_now();
        let unlocated = make_issue(
            "unlocated",
            Category::Roads,
            Status::Submitted,
            Priority::Medium,
            at(1, now),
        );
        let params = QueryParams {
            center: Coordinates::new(40.0, -74.0).ok(),
            radius_km: None,
            ..QueryParams::default()
        };
        let result = run(vec![unlocated], &params);
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn map_view_drops_coordinate_less_issues_unconditionally() {
        let now = fixed_now();
        let mut located = make_issue(
            "located",
            Category::Roads,
            Status::Submitted,
            Priority::Medium,
            at(1, now),
        );
        located.coordinates = Coordinates::new(40.0, -74.0).ok();
        let unlocated = make_issue(
            "unlocated",
            Category::Roads,
            Status::Submitted,
            Priority::Medium,
            at(2, now),
        );

        let params = QueryParams {
            require_coordinates: true,
            ..QueryParams::default()
        };
        let result = run(vec![located, unlocated], &params);
        assert_eq!(result.total_count, 1);
    }

    #[test]
    fn newest_and_oldest_orderings() {
        let now = fixed_now();
        let a = make_issue(
            "A",
            Category::Other,
            Status::Submitted,
            Priority::Medium,
            at(2, now),
        );
        let b = make_issue(
            "B",
            Category::Other,
            Status::Submitted,
            Priority::Medium,
            at(1, now),
        );

        let newest = run(vec![a.clone(), b.clone()], &QueryParams::default());
        let titles: Vec<&str> = newest.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);

        let oldest = run(
            vec![a, b],
            &QueryParams {
                sort_by: SortBy::Oldest,
                ..QueryParams::default()
            },
        );
        let titles: Vec<&str> = oldest.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn status_sort_follows_graph_order() {
        let now = fixed_now();
        let issues = vec![
            make_issue(
                "closed",
                Category::Other,
                Status::Closed,
                Priority::Medium,
                at(1, now),
            ),
            make_issue(
                "submitted",
                Category::Other,
                Status::Submitted,
                Priority::Medium,
                at(2, now),
            ),
            make_issue(
                "in_progress",
                Category::Other,
                Status::InProgress,
                Priority::Medium,
                at(3, now),
            ),
        ];
        let result = run(
            issues,
            &QueryParams {
                sort_by: SortBy::Status,
                ..QueryParams::default()
            },
        );
        let titles: Vec<&str> = result.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["submitted", "in_progress", "closed"]);
    }

    #[test]
    fn priority_sort_puts_critical_first() {
        let now = fixed_now();
        let issues = vec![
            make_issue(
                "low",
                Category::Other,
                Status::Submitted,
                Priority::Low,
                at(1, now),
            ),
            make_issue(
                "critical",
                Category::Other,
                Status::Submitted,
                Priority::Critical,
                at(2, now),
            ),
            make_issue(
                "high",
                Category::Other,
                Status::Submitted,
                Priority::High,
                at(3, now),
            ),
        ];
        let result = run(
            issues,
            &QueryParams {
                sort_by: SortBy::Priority,
                ..QueryParams::default()
            },
        );
        let titles: Vec<&str> = result.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["critical", "high", "low"]);
    }

    #[test]
    fn most_voted_sorts_by_upvotes_then_recency() {
        let now = fixed_now();
        let a = make_issue(
            "two votes",
            Category::Other,
            Status::Submitted,
            Priority::Medium,
            at(5, now),
        );
        let b = make_issue(
            "no votes new",
            Category::Other,
            Status::Submitted,
            Priority::Medium,
            at(1, now),
        );
        let c = make_issue(
            "no votes old",
            Category::Other,
            Status::Submitted,
            Priority::Medium,
            at(9, now),
        );
        let mut upvotes = HashMap::new();
        upvotes.insert(a.id, 2);

        let params = QueryParams {
            sort_by: SortBy::MostVoted,
            ..QueryParams::default()
        };
        let Ok(result) = query(vec![b, c, a], &upvotes, &params, now) else {
            panic!("query failed");
        };
        let titles: Vec<&str> = result.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["two votes", "no votes new", "no votes old"]);
    }

    #[test]
    fn pagination_counts_before_slicing() {
        let now = fixed_now();
        let issues: Vec<Issue> = (0..7)
            .map(|i| {
                make_issue(
                    &format!("issue {i}"),
                    Category::Other,
                    Status::Submitted,
                    Priority::Medium,
                    at(i, now),
                )
            })
            .collect();

        let params = QueryParams {
            page: 2,
            page_size: 3,
            ..QueryParams::default()
        };
        let result = run(issues.clone(), &params);
        assert_eq!(result.total_count, 7);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.items.len(), 3);

        // Page past the end is an empty page, not an error.
        let past = QueryParams {
            page: 9,
            page_size: 3,
            ..QueryParams::default()
        };
        let result = run(issues, &past);
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 7);
    }

    #[test]
    fn items_never_exceed_page_size() {
        let now = fixed_now();
        let issues: Vec<Issue> = (0..25)
            .map(|i| {
                make_issue(
                    &format!("issue {i}"),
                    Category::Other,
                    Status::Submitted,
                    Priority::Medium,
                    at(i, now),
                )
            })
            .collect();
        let result = run(issues, &QueryParams::default());
        assert!(result.items.len() <= 20);
        assert_eq!(result.total_count, 25);
    }

    #[test]
    fn non_positive_page_size_is_rejected() {
        for size in [0, -5] {
            let params = QueryParams {
                page_size: size,
                ..QueryParams::default()
            };
            let result = query(Vec::new(), &HashMap::new(), &params, fixed_now());
            assert!(matches!(result, Err(GatewayError::InvalidPageSize(_))));
        }
    }

    #[test]
    fn non_finite_radius_is_rejected() {
        let now = fixed_now();
        let mut located = make_issue(
            "located",
            Category::Roads,
            Status::Submitted,
            Priority::Medium,
            at(1, now),
        );
        located.coordinates = Coordinates::new(40.0, -74.0).ok();
        let params = QueryParams {
            center: Coordinates::new(40.0, -74.0).ok(),
            radius_km: Some(f64::NAN),
            ..QueryParams::default()
        };
        let result = query(vec![located], &HashMap::new(), &params, now);
        assert!(matches!(result, Err(GatewayError::InvalidCoordinate(_))));
    }
}
