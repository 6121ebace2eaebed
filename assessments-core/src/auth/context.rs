//! Authentication context types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication context for a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AuthContext {
    /// Authentication disabled, caller treated as a trusted local user
    Local,
    /// Caller presented a valid bearer token
    Authenticated {
        /// The authenticated caller's identity
        identity: CallerIdentity,
    },
}

impl AuthContext {
    /// Returns the identity if authenticated, None otherwise
    pub fn identity(&self) -> Option<&CallerIdentity> {
        match self {
            AuthContext::Authenticated { identity } => Some(identity),
            AuthContext::Local => None,
        }
    }

    /// Returns true if authentication was bypassed
    pub fn is_local(&self) -> bool {
        matches!(self, AuthContext::Local)
    }
}

impl fmt::Display for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthContext::Local => f.write_str("local"),
            AuthContext::Authenticated { identity } => f.write_str(&identity.subject),
        }
    }
}

/// Identity carried by a validated token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Token subject (user id)
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// When the token expires
    pub expires_at: DateTime<Utc>,
}

impl CallerIdentity {
    pub fn new(subject: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
            name: None,
            roles: Vec::new(),
            expires_at,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
