//! Vote-related DTOs for the toggle and counts endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::vote::{ToggleAction, VoteCounts};

/// Request body for `POST /issues/:id/votes`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VoteRequest {
    /// Authenticated voter. Absent means the request is anonymous and is
    /// rejected with 401.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Vote kind string: `"upvote"` or `"important"`.
    pub kind: String,
}

/// Response body for the vote toggle.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VoteToggleResponse {
    /// Whether the vote was added or removed.
    pub action: ToggleAction,
}

/// Current vote tallies for an issue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VoteCountsDto {
    /// Number of active upvotes.
    pub upvotes: u64,
    /// Number of active importance flags.
    pub important: u64,
}

impl From<VoteCounts> for VoteCountsDto {
    fn from(counts: VoteCounts) -> Self {
        Self {
            upvotes: counts.upvotes,
            important: counts.important,
        }
    }
}
