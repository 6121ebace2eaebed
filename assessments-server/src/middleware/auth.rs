//! Authentication middleware for axum

use std::sync::Arc;

use assessments_core::{AuthConfig, AuthContext, AuthError, JwtValidator};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

/// Authentication layer state
#[derive(Clone)]
pub struct AuthLayer {
    validator: Option<Arc<JwtValidator>>,
    config: AuthConfig,
}

impl AuthLayer {
    /// Create a new AuthLayer with the given configuration.
    ///
    /// An enabled config without a secret rejects every request.
    pub fn new(config: AuthConfig) -> Self {
        let validator = if config.enabled && config.is_valid() {
            Some(Arc::new(JwtValidator::new(config.clone())))
        } else {
            None
        };
        if config.enabled && validator.is_none() {
            tracing::error!("Authentication enabled without a secret, rejecting all requests");
        }

        Self { validator, config }
    }

    /// Create a disabled AuthLayer (for testing or when auth is not configured)
    pub fn disabled() -> Self {
        Self {
            validator: None,
            config: AuthConfig::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Resolve the caller for a request's `Authorization` header value
    fn authenticate(&self, header: Option<&str>) -> Result<AuthContext, AuthError> {
        if !self.config.enabled {
            return Ok(AuthContext::Local);
        }
        let validator = self.validator.as_ref().ok_or(AuthError::NotConfigured)?;

        let token = header
            .and_then(extract_bearer)
            .ok_or(AuthError::MissingToken)?;
        let identity = validator.validate(token)?;

        Ok(AuthContext::Authenticated { identity })
    }
}

/// Extract the token from a `Bearer <token>` header value
fn extract_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication middleware function
pub async fn auth_middleware(
    State(auth_layer): State<AuthLayer>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_context = match auth_layer.authenticate(header) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::debug!("Authentication failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::debug!(caller = %auth_context, enforced = auth_layer.config.enabled, "Caller resolved");

    // Attach auth context to request extensions
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessments_core::auth::{TokenRequest, issue_token};
    use chrono::Duration;

    fn token(config: &AuthConfig, roles: &[&str]) -> String {
        issue_token(
            config,
            TokenRequest {
                subject: "teacher-1".into(),
                email: None,
                name: None,
                roles: roles.iter().map(|r| r.to_string()).collect(),
                ttl: Duration::minutes(5),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer("bearer abc "), Some("abc"));
        assert_eq!(extract_bearer("Basic abc"), None);
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("abc"), None);
    }

    #[test]
    fn test_auth_layer_disabled() {
        let layer = AuthLayer::disabled();
        assert!(!layer.is_enabled());
        assert!(!layer.config.enabled);
        assert_eq!(layer.authenticate(None).unwrap(), AuthContext::Local);
    }

    #[test]
    fn test_auth_layer_enabled() {
        let config = AuthConfig::new("secret");
        let layer = AuthLayer::new(config.clone());
        assert!(layer.is_enabled());

        assert!(matches!(
            layer.authenticate(None),
            Err(AuthError::MissingToken)
        ));

        let header = format!("Bearer {}", token(&config, &[]));
        let ctx = layer.authenticate(Some(&header)).unwrap();
        assert_eq!(ctx.identity().unwrap().subject, "teacher-1");
    }

    #[test]
    fn test_auth_layer_enabled_without_secret_rejects_everyone() {
        let config = AuthConfig {
            enabled: true,
            ..AuthConfig::default()
        };
        let layer = AuthLayer::new(config);
        assert!(layer.is_enabled());

        assert!(matches!(
            layer.authenticate(None),
            Err(AuthError::NotConfigured)
        ));

        // A token signed with the empty secret is not accepted either
        let forged = token(&AuthConfig::new(""), &[]);
        let header = format!("Bearer {forged}");
        assert!(matches!(
            layer.authenticate(Some(&header)),
            Err(AuthError::NotConfigured)
        ));
    }

    #[test]
    fn test_disabled_config_is_local() {
        let layer = AuthLayer::new(AuthConfig::default());
        assert!(!layer.is_enabled());
        assert_eq!(layer.authenticate(None).unwrap(), AuthContext::Local);
    }

    #[test]
    fn test_required_role() {
        let config = AuthConfig::new("secret").with_required_role("instructor");
        let layer = AuthLayer::new(config.clone());

        let header = format!("Bearer {}", token(&config, &["student"]));
        assert!(layer.authenticate(Some(&header)).unwrap_err().is_forbidden());

        let header = format!("Bearer {}", token(&config, &["instructor"]));
        assert!(layer.authenticate(Some(&header)).is_ok());
    }
}
