//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use portal::{AuthProvider, Portal};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection, used directly by the health check.
    pub db: Database,
    /// Portal services.
    pub portal: Portal,
    /// Bearer token resolution.
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, portal: Portal, auth: Arc<dyn AuthProvider>) -> Self {
        Self { db, portal, auth }
    }
}
