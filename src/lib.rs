//! # civic-gateway
//!
//! REST API gateway for citizen-reported civic issue tracking.
//!
//! Citizens report issues (potholes, sanitation, utilities, etc.) with
//! optional GPS coordinates; staff move each issue through a lifecycle
//! state machine; the resulting dataset is served through three views
//! that always agree — a filterable list, a geospatial map, and
//! aggregate statistics.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── IssueService (service/)
//!     │
//!     ├── IssueStore + Query/Stats/Geo (domain/)
//!     │
//!     └── PostgreSQL Persistence
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
