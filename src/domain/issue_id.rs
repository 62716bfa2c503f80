//! Type-safe issue identifier.
//!
//! [`IssueId`] is a newtype wrapper around [`uuid::Uuid`] (v4) providing
//! type safety so that issue identifiers cannot be confused with user or
//! other UUIDs flowing through the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a reported civic issue.
///
/// Wraps a UUID v4. Generated once at submission time and immutable
/// thereafter. Used as the dictionary key in [`super::IssueStore`] and as
/// the foreign key on update-trail and vote rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct IssueId(uuid::Uuid);

impl IssueId {
    /// Creates a new random `IssueId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates an `IssueId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for IssueId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<IssueId> for uuid::Uuid {
    fn from(id: IssueId) -> Self {
        id.0
    }
}
