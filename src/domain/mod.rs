//! Domain layer: core types and logic for the issue lifecycle.
//!
//! This module contains the issue aggregate and its taxonomies, the
//! lifecycle status graph, geospatial math, the vote ledger types, the
//! concurrent issue store, the query engine, and the stats aggregator.

pub mod geo;
pub mod issue;
pub mod issue_id;
pub mod query;
pub mod stats;
pub mod status;
pub mod store;
pub mod vote;

pub use geo::Coordinates;
pub use issue::{Category, Issue, IssueUpdate, NewIssue, Priority, ReporterContact};
pub use issue_id::IssueId;
pub use query::{QueryParams, QueryResult, SortBy, TimeRange};
pub use stats::DerivedStats;
pub use status::Status;
pub use store::IssueStore;
pub use vote::{ToggleAction, Vote, VoteCounts, VoteKind};
