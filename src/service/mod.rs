//! Service layer: business logic orchestration.
//!
//! [`IssueService`] coordinates lifecycle, voting, query, and stats
//! operations over the [`crate::domain::IssueStore`], writing through to
//! PostgreSQL when persistence is enabled.

pub mod issue_service;

pub use issue_service::IssueService;
