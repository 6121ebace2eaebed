use std::path::PathBuf;

use assessments_core::{AuthConfig, StorageConfig};
use serde::{Deserialize, Serialize};

/// Default port for the assessment server
pub const DEFAULT_PORT: u16 = 7743;
/// Default host for the assessment server
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default MongoDB connection string
pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
/// Default MongoDB database
pub const DEFAULT_DATABASE: &str = "assessments";
/// Default directory rendered papers are written to
pub const DEFAULT_OUTPUT_DIR: &str = "papers";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAssessmentsConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub auth: RawAuthConfig,

    #[serde(default)]
    pub store: RawStoreConfig,

    #[serde(default)]
    pub storage: RawStorageConfig,

    #[serde(default)]
    pub renderer: RawRendererConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub expose_grading_routes: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAuthConfig {
    pub enabled: Option<bool>,
    pub secret: Option<String>,
    pub audience: Option<String>,
    pub issuer: Option<String>,
    pub required_role: Option<String>,
    pub clock_skew_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStoreConfig {
    pub backend: Option<StoreBackend>,
    pub uri: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStorageConfig {
    pub base_url: Option<String>,
    pub signing_secret: Option<String>,
    pub url_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRendererConfig {
    pub output_dir: Option<PathBuf>,
}

/// Document store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Mongo,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AssessmentsConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub renderer: RendererConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Register the bulk grading and student grade routes
    pub expose_grading_routes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            expose_grading_routes: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Connection string, used by the mongo backend
    pub uri: String,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            uri: DEFAULT_MONGO_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    pub output_dir: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}
