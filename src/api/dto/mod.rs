//! Data Transfer Objects for REST request/response serialization.
//!
//! Enum-valued request fields travel as strings and are parsed at this
//! boundary so validation can report every bad field in one pass.

pub mod common_dto;
pub mod issue_dto;
pub mod vote_dto;

pub use common_dto::*;
pub use issue_dto::*;
pub use vote_dto::*;
