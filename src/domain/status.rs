//! Issue lifecycle status and the canonical transition graph.
//!
//! The graph is `submitted → in_review → assigned → in_progress → resolved
//! → closed`, with `rejected` reachable from every state before `resolved`.
//! `closed` and `rejected` are terminal: no forward transition leaves them.
//! Annotations (audit comments) are allowed in every status and never
//! change it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a reported issue.
///
/// A closed enumeration: the transition graph, sort order, and the stats
/// maps all match on it exhaustively, so adding a status forces every
/// consumer to be updated consciously.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Freshly reported by a citizen; not yet looked at.
    Submitted,
    /// Staff are verifying the report.
    InReview,
    /// Assigned to a crew or department.
    Assigned,
    /// Work is underway.
    InProgress,
    /// Work finished; `resolved_at` is stamped on entry.
    Resolved,
    /// Archived after resolution. Terminal.
    Closed,
    /// Report declined (duplicate, out of jurisdiction, spam). Terminal.
    Rejected,
}

impl Status {
    /// All statuses in lifecycle graph order.
    pub const ALL: [Self; 7] = [
        Self::Submitted,
        Self::InReview,
        Self::Assigned,
        Self::InProgress,
        Self::Resolved,
        Self::Closed,
        Self::Rejected,
    ];

    /// Statuses reachable from `self` in one transition.
    #[must_use]
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::Submitted => &[Self::InReview, Self::Rejected],
            Self::InReview => &[Self::Assigned, Self::Rejected],
            Self::Assigned => &[Self::InProgress, Self::Rejected],
            Self::InProgress => &[Self::Resolved, Self::Rejected],
            Self::Resolved => &[Self::Closed],
            Self::Closed | Self::Rejected => &[],
        }
    }

    /// Returns `true` if `to` is reachable from `self` in one transition.
    ///
    /// No-op self-transitions are not part of the graph; re-annotation is
    /// done via the annotate operation, never via transition.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.successors().contains(&to)
    }

    /// Returns `true` for statuses no forward transition leaves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Rejected)
    }

    /// Sort rank in lifecycle graph order (not alphabetical), used by the
    /// query engine's `status` sort.
    #[must_use]
    pub const fn sort_rank(self) -> u8 {
        match self {
            Self::Submitted => 0,
            Self::InReview => 1,
            Self::Assigned => 2,
            Self::InProgress => 3,
            Self::Resolved => 4,
            Self::Closed => 5,
            Self::Rejected => 6,
        }
    }

    /// Wire string for this status (matches the serde representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::InReview => "in_review",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "in_review" => Ok(Self::InReview),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_a_chain() {
        assert!(Status::Submitted.can_transition_to(Status::InReview));
        assert!(Status::InReview.can_transition_to(Status::Assigned));
        assert!(Status::Assigned.can_transition_to(Status::InProgress));
        assert!(Status::InProgress.can_transition_to(Status::Resolved));
        assert!(Status::Resolved.can_transition_to(Status::Closed));
    }

    #[test]
    fn skipping_stages_is_rejected() {
        assert!(!Status::Submitted.can_transition_to(Status::InProgress));
        assert!(!Status::Submitted.can_transition_to(Status::Resolved));
        assert!(!Status::InReview.can_transition_to(Status::Resolved));
    }

    #[test]
    fn rejected_reachable_from_every_non_terminal_state() {
        for status in [
            Status::Submitted,
            Status::InReview,
            Status::Assigned,
            Status::InProgress,
        ] {
            assert!(status.can_transition_to(Status::Rejected), "{status}");
        }
        // Resolved is past the point of rejection.
        assert!(!Status::Resolved.can_transition_to(Status::Rejected));
    }

    #[test]
    fn terminal_statuses_have_no_successors() {
        for status in [Status::Closed, Status::Rejected] {
            assert!(status.is_terminal());
            for target in Status::ALL {
                assert!(!status.can_transition_to(target), "{status} -> {target}");
            }
        }
    }

    #[test]
    fn self_transitions_are_never_allowed() {
        for status in Status::ALL {
            assert!(!status.can_transition_to(status), "{status}");
        }
    }

    #[test]
    fn sort_rank_follows_graph_order() {
        let ranks: Vec<u8> = Status::ALL.iter().map(|s| s.sort_rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn string_round_trip() {
        for status in Status::ALL {
            let parsed = Status::from_str(status.as_str());
            assert_eq!(parsed, Ok(status));
        }
        assert!(Status::from_str("reopened").is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Status::InProgress).ok();
        assert_eq!(json.as_deref(), Some("\"in_progress\""));
    }
}
