//! Authentication error types

use thiserror::Error;

/// Errors that can occur during authentication
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token was provided in the request
    #[error("no authentication token provided")]
    MissingToken,

    /// The token signature verification failed
    #[error("token signature verification failed")]
    InvalidSignature,

    /// The token has expired
    #[error("token has expired")]
    Expired,

    /// The token's audience claim doesn't match the expected value
    #[error("invalid audience claim")]
    InvalidAudience,

    /// The token's issuer claim doesn't match the expected value
    #[error("invalid issuer claim")]
    InvalidIssuer,

    /// Authentication is enforced but no signing secret is configured
    #[error("authentication is enabled without a signing secret")]
    NotConfigured,

    /// Requested token lifetime cannot be represented
    #[error("token lifetime out of range")]
    InvalidLifetime,

    /// The caller lacks the configured role
    #[error("missing required role: {0}")]
    Forbidden(String),

    /// JWT decoding or encoding error from jsonwebtoken crate
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// True when the caller is known but not allowed
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}
