//! Application state for the API server

use crate::{Config, SearchController};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The search controller owned by the application
    pub controller: Arc<SearchController>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(controller: Arc<SearchController>, config: Arc<Config>) -> Self {
        Self { controller, config }
    }
}
