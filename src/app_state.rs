//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::IssueService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Issue service for all business logic.
    pub issue_service: Arc<IssueService>,
}
