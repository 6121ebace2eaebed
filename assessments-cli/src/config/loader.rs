use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use assessments_core::{AuthConfig, StorageConfig};
use directories::ProjectDirs;

use super::types::{
    AssessmentsConfig, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_MONGO_URI, DEFAULT_OUTPUT_DIR,
    DEFAULT_PORT, RawAssessmentsConfig, RawAuthConfig, RawRendererConfig, RawServerConfig,
    RawStorageConfig, RawStoreConfig, RendererConfig, ServerConfig, StoreConfig,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user, then project, then `explicit`)
    pub fn load(explicit: Option<&Path>) -> Result<AssessmentsConfig> {
        let mut layers = Vec::new();
        if let Some(user_path) = Self::user_config_path() {
            layers.push(user_path);
        }
        layers.push(Self::project_config_path());

        let mut raw = Self::load_layers(&layers)?;

        if let Some(path) = explicit {
            let explicit_config = Self::read_raw(path)?;
            raw = Self::merge_raw(raw, explicit_config);
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw))
    }

    /// Merge every existing file in order, later files winning
    fn load_layers(paths: &[PathBuf]) -> Result<RawAssessmentsConfig> {
        let mut raw = RawAssessmentsConfig::default();
        for path in paths.iter().filter(|p| p.exists()) {
            tracing::debug!("Loading config from {}", path.display());
            raw = Self::merge_raw(raw, Self::read_raw(path)?);
        }
        Ok(raw)
    }

    fn read_raw(path: &Path) -> Result<RawAssessmentsConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "assessments").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with ASSESSMENTS_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("ASSESSMENTS_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".assessments/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawAssessmentsConfig, overlay: RawAssessmentsConfig) -> RawAssessmentsConfig {
        RawAssessmentsConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                expose_grading_routes: overlay
                    .server
                    .expose_grading_routes
                    .or(base.server.expose_grading_routes),
            },
            auth: RawAuthConfig {
                enabled: overlay.auth.enabled.or(base.auth.enabled),
                secret: overlay.auth.secret.or(base.auth.secret),
                audience: overlay.auth.audience.or(base.auth.audience),
                issuer: overlay.auth.issuer.or(base.auth.issuer),
                required_role: overlay.auth.required_role.or(base.auth.required_role),
                clock_skew_seconds: overlay
                    .auth
                    .clock_skew_seconds
                    .or(base.auth.clock_skew_seconds),
            },
            store: RawStoreConfig {
                backend: overlay.store.backend.or(base.store.backend),
                uri: overlay.store.uri.or(base.store.uri),
                database: overlay.store.database.or(base.store.database),
            },
            storage: RawStorageConfig {
                base_url: overlay.storage.base_url.or(base.storage.base_url),
                signing_secret: overlay.storage.signing_secret.or(base.storage.signing_secret),
                url_ttl_seconds: overlay.storage.url_ttl_seconds.or(base.storage.url_ttl_seconds),
            },
            renderer: RawRendererConfig {
                output_dir: overlay.renderer.output_dir.or(base.renderer.output_dir),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawAssessmentsConfig) -> AssessmentsConfig {
        let auth_defaults = AuthConfig::default();
        let storage_defaults = StorageConfig::default();

        let auth = AuthConfig {
            enabled: raw.auth.enabled.unwrap_or(false),
            secret: raw.auth.secret.unwrap_or_default(),
            audience: raw.auth.audience,
            issuer: raw.auth.issuer,
            required_role: raw.auth.required_role,
            clock_skew_seconds: raw
                .auth
                .clock_skew_seconds
                .unwrap_or(auth_defaults.clock_skew_seconds),
        };

        // Paper URLs are signed with the API secret unless a separate one is set
        let signing_secret = raw
            .storage
            .signing_secret
            .filter(|secret| !secret.is_empty())
            .unwrap_or_else(|| auth.secret.clone());

        AssessmentsConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
                expose_grading_routes: raw.server.expose_grading_routes.unwrap_or(false),
            },
            auth,
            store: StoreConfig {
                backend: raw.store.backend.unwrap_or_default(),
                uri: raw
                    .store
                    .uri
                    .unwrap_or_else(|| DEFAULT_MONGO_URI.to_string()),
                database: raw
                    .store
                    .database
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            },
            storage: StorageConfig {
                base_url: raw.storage.base_url.unwrap_or(storage_defaults.base_url),
                signing_secret,
                url_ttl_seconds: raw
                    .storage
                    .url_ttl_seconds
                    .unwrap_or(storage_defaults.url_ttl_seconds),
            },
            renderer: RendererConfig {
                output_dir: raw
                    .renderer
                    .output_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            },
        }
    }
}
