//! assessments-server - HTTP server for the assessment service
//!
//! This crate owns the axum router, the bearer-token middleware and the
//! mapping from domain errors to HTTP responses. Handlers delegate to the
//! [`assessments_core::AssessmentService`] held in [`AppState`].

mod error;
pub mod http;
pub mod middleware;
mod state;

use std::sync::Arc;

use tokio::net::TcpListener;

pub use error::{ApiError, ErrorResponse, ServerError};
pub use http::create_router;
pub use middleware::{AuthLayer, auth_middleware};
pub use state::AppState;

/// The main assessment server
pub struct AssessmentServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl AssessmentServer {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("assessment server listening on {}", addr);
        self.run_with_listener(listener).await
    }

    /// Run the server on an already-bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        if self.config.expose_grading_routes {
            tracing::info!("Grading routes enabled");
        }
        if !self.state.auth.is_enabled() {
            tracing::warn!("Authentication disabled, all callers are treated as local");
        }

        let router = create_router(self.state, &self.config);
        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Register `/{type}/grade` and `/{type}/grades`
    pub expose_grading_routes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7743,
            expose_grading_routes: false,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            expose_grading_routes: false,
        }
    }

    pub fn with_grading_routes(mut self, enabled: bool) -> Self {
        self.expose_grading_routes = enabled;
        self
    }

    /// Returns the socket address string (e.g., "127.0.0.1:7743")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7743);
        assert!(!config.expose_grading_routes);
    }

    #[test]
    fn test_server_config_addr() {
        let config = ServerConfig::new("0.0.0.0", 8080).with_grading_routes(true);
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert!(config.expose_grading_routes);
    }

    #[test]
    fn test_assessment_server_new() {
        let (state, _store, _dir) = state::testing::test_state();
        let server = AssessmentServer::new(ServerConfig::new("127.0.0.1", 9000), Arc::new(state));
        assert_eq!(server.config().port, 9000);
        assert!(!server.state().auth.is_enabled());
    }
}
