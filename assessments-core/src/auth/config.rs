//! Configuration for bearer-token authentication

use serde::{Deserialize, Serialize};

/// Configuration for JWT bearer authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether authentication is enforced
    #[serde(default)]
    pub enabled: bool,

    /// HS256 shared secret tokens are signed with
    #[serde(default)]
    pub secret: String,

    /// Expected `aud` claim, if any
    #[serde(default)]
    pub audience: Option<String>,

    /// Expected `iss` claim, if any
    #[serde(default)]
    pub issuer: Option<String>,

    /// Role every caller must carry in its `roles` claim
    #[serde(default)]
    pub required_role: Option<String>,

    /// Clock skew leeway in seconds for token expiry validation
    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: u64,
}

fn default_clock_skew() -> u64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret: String::new(),
            audience: None,
            issuer: None,
            required_role: None,
            clock_skew_seconds: default_clock_skew(),
        }
    }
}

impl AuthConfig {
    /// Create an enabled config with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            enabled: true,
            secret: secret.into(),
            ..Self::default()
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_required_role(mut self, role: impl Into<String>) -> Self {
        self.required_role = Some(role.into());
        self
    }

    /// Check if the config is valid (has a secret when enabled)
    pub fn is_valid(&self) -> bool {
        !self.enabled || !self.secret.is_empty()
    }
}
