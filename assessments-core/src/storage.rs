//! Object storage seam: signed URL issuance for stored documents

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the storage collaborator
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid object reference: {0}")]
    InvalidReference(String),

    #[error("Failed to sign URL: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("No URL signing secret configured")]
    MissingSecret,

    #[error("URL lifetime must be between 1 and {MAX_URL_TTL_SECONDS} seconds, got {0}")]
    InvalidTtl(u64),
}

/// Longest accepted URL lifetime (seven days)
pub const MAX_URL_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Issues time-limited links to stored objects
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn signed_url(&self, object_ref: &str) -> Result<String, StorageError>;
}

/// Configuration for [`SignedUrlIssuer`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Public base URL objects are served from
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HMAC secret used to sign URLs
    #[serde(default)]
    pub signing_secret: String,

    /// Lifetime of an issued URL, at most [`MAX_URL_TTL_SECONDS`]
    #[serde(default = "default_url_ttl")]
    pub url_ttl_seconds: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:7743/documents".to_string()
}

fn default_url_ttl() -> u64 {
    3600
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            signing_secret: String::new(),
            url_ttl_seconds: default_url_ttl(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs object URLs with an HS256 token carrying the object and expiry
pub struct SignedUrlIssuer {
    base_url: String,
    key: EncodingKey,
    ttl_seconds: i64,
}

impl SignedUrlIssuer {
    /// Fails without a signing secret or with an out-of-range lifetime
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.signing_secret.is_empty() {
            return Err(StorageError::MissingSecret);
        }
        let ttl_seconds = Some(config.url_ttl_seconds)
            .filter(|ttl| (1..=MAX_URL_TTL_SECONDS).contains(ttl))
            .and_then(|ttl| i64::try_from(ttl).ok())
            .ok_or(StorageError::InvalidTtl(config.url_ttl_seconds))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            ttl_seconds,
        })
    }
}

#[async_trait]
impl ObjectStorage for SignedUrlIssuer {
    async fn signed_url(&self, object_ref: &str) -> Result<String, StorageError> {
        let object_ref = object_ref.trim_start_matches('/');
        if object_ref.is_empty() || object_ref.split('/').any(|part| part == "..") {
            return Err(StorageError::InvalidReference(object_ref.to_string()));
        }

        let now = Utc::now().timestamp();
        let claims = ObjectClaims {
            sub: object_ref.to_string(),
            iat: now,
            exp: now + self.ttl_seconds,
        };
        let token = encode(&Header::default(), &claims, &self.key)?;

        Ok(format!("{}/{}?token={}", self.base_url, object_ref, token))
    }
}
