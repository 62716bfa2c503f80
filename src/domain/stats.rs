//! Derived statistics over the full issue set.
//!
//! Always computed from the global, unfiltered set, independent of any
//! list/map filter currently active, so the stats panel stays a stable
//! reference point next to the other two views. Never persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::issue::{Category, Issue, Priority};
use super::status::Status;

/// Length of the "recent" trailing window in days.
const RECENT_WINDOW_DAYS: i64 = 7;

/// Aggregate counts recomputed on demand.
///
/// The maps are ordered so serialization is reproducible for a fixed
/// input set and `now` (counts themselves are commutative).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DerivedStats {
    /// Total number of issues.
    pub total: u64,
    /// Issue counts keyed by lifecycle status.
    pub by_status: BTreeMap<Status, u64>,
    /// Issue counts keyed by category.
    pub by_category: BTreeMap<Category, u64>,
    /// Issue counts keyed by priority.
    pub by_priority: BTreeMap<Priority, u64>,
    /// Issues created within the trailing 7 days of the query time.
    pub recent_count: u64,
}

/// Computes [`DerivedStats`] for the given issue set at time `now`.
///
/// Pure: tolerates an empty input (zero total, empty maps) and is
/// deterministic for fixed inputs. The recent window is
/// `[now - 7d, now]`; future-dated issues are not counted as recent.
#[must_use]
pub fn compute(issues: &[Issue], now: DateTime<Utc>) -> DerivedStats {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let mut stats = DerivedStats::default();

    for issue in issues {
        stats.total += 1;
        *stats.by_status.entry(issue.status).or_default() += 1;
        *stats.by_category.entry(issue.category).or_default() += 1;
        *stats.by_priority.entry(issue.priority).or_default() += 1;
        if issue.created_at >= cutoff && issue.created_at <= now {
            stats.recent_count += 1;
        }
    }

    stats
}
