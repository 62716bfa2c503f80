//! Vote types for the idempotent per-user toggle ledger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::IssueId;

/// A category of community endorsement, tracked independently per
/// issue/user pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    /// General support; feeds the `most_voted` sort key.
    Upvote,
    /// Flags the issue as important/urgent to the community.
    Important,
}

impl VoteKind {
    /// Wire string for this kind (matches the serde representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Important => "important",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(Self::Upvote),
            "important" => Ok(Self::Important),
            other => Err(format!("unknown vote kind: {other}")),
        }
    }
}

/// A single vote row. Presence means the vote is "on"; uniqueness on the
/// `(issue_id, user_id, kind)` triple is enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vote {
    /// Issue being endorsed.
    pub issue_id: IssueId,
    /// Authenticated voter.
    pub user_id: Uuid,
    /// Endorsement kind.
    pub kind: VoteKind,
}

/// Outcome of a toggle call: the same request alternates between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    /// The vote row was inserted.
    Added,
    /// The vote row already existed and was removed.
    Removed,
}

/// Current per-issue vote tallies, always recomputed from the live row
/// set so they never drift from the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    /// Number of active upvotes.
    pub upvotes: u64,
    /// Number of active importance flags.
    pub important: u64,
}
