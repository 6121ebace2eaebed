//! HS256 JWT validation and development token issuance

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::{AuthConfig, AuthError, CallerIdentity};

/// Claims carried by caller tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// JWT validator for caller tokens
pub struct JwtValidator {
    config: AuthConfig,
    key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Create a new JwtValidator with the given configuration
    pub fn new(config: AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.clock_skew_seconds;
        match &config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = &config.issuer {
            validation.set_issuer(&[iss]);
        }

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
            validation,
        }
    }

    /// Validate a JWT token and return the identity
    pub fn validate(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let claims = decode::<CallerClaims>(token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidAudience => AuthError::InvalidAudience,
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::JwtError(e),
            })?
            .claims;

        if let Some(role) = &self.config.required_role {
            if !claims.roles.iter().any(|r| r == role) {
                return Err(AuthError::Forbidden(role.clone()));
            }
        }

        let expires_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
        let mut identity = CallerIdentity::new(claims.sub, expires_at);
        identity.email = claims.email;
        identity.name = claims.name;
        identity.roles = claims.roles;

        Ok(identity)
    }
}

/// Parameters for [`issue_token`]
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub ttl: Duration,
}

/// Sign a caller token accepted by a [`JwtValidator`] built from the same config
pub fn issue_token(config: &AuthConfig, request: TokenRequest) -> Result<String, AuthError> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(request.ttl)
        .ok_or(AuthError::InvalidLifetime)?;
    let claims = CallerClaims {
        sub: request.subject,
        email: request.email,
        name: request.name,
        roles: request.roles,
        aud: config.audience.clone(),
        iss: config.issuer.clone(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?)
}
