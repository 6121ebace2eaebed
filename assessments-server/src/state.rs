//! Shared application state

use std::sync::Arc;

use assessments_core::AssessmentService;
use chrono::{DateTime, Utc};

use crate::middleware::AuthLayer;

/// State shared by every handler
pub struct AppState {
    /// Assessment operations
    pub service: Arc<AssessmentService>,
    /// Caller authentication
    pub auth: AuthLayer,
    /// When the server was started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state with authentication disabled
    pub fn new(service: Arc<AssessmentService>) -> Self {
        Self {
            service,
            auth: AuthLayer::disabled(),
            started_at: Utc::now(),
        }
    }

    pub fn with_auth(mut self, auth: AuthLayer) -> Self {
        self.auth = auth;
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
