//! Serve command for running the assessment server
//!
//! Loads the layered configuration, wires the document store, renderer,
//! signed-URL issuer and course directory into an [`AssessmentService`]
//! and serves it over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use assessments_core::{
    AssessmentService, DocumentStore, LatexRenderer, MemoryDocumentStore, SignedUrlIssuer,
    StoreCourseDirectory,
};
use assessments_server::{AppState, AssessmentServer, AuthLayer, ServerConfig};
use clap::Args;
use tracing::info;

use crate::config::{AssessmentsConfig, ConfigLoader, StoreBackend, StoreConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Additional config file, applied over user and project config
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Register the grading routes
    #[arg(long)]
    pub expose_grading_routes: bool,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = ConfigLoader::load(args.config.as_deref())?;
    let server_config = server_config(&args, &config);

    if !config.auth.is_valid() {
        bail!("auth.enabled is set but auth.secret is empty");
    }

    let store = build_store(&config.store).await?;
    let service = build_service(&config, store)?;

    let auth = if config.auth.enabled {
        AuthLayer::new(config.auth.clone())
    } else {
        AuthLayer::disabled()
    };
    let state = Arc::new(AppState::new(Arc::new(service)).with_auth(auth));

    info!(
        "Starting assessment server on {}:{}",
        server_config.host, server_config.port
    );

    AssessmentServer::new(server_config, state)
        .run()
        .await
        .map_err(Into::into)
}

/// CLI flags win over the loaded config
fn server_config(args: &ServeArgs, config: &AssessmentsConfig) -> ServerConfig {
    let host = args.host.clone().unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    ServerConfig::new(host, port)
        .with_grading_routes(args.expose_grading_routes || config.server.expose_grading_routes)
}

fn build_service(
    config: &AssessmentsConfig,
    store: Arc<dyn DocumentStore>,
) -> Result<AssessmentService> {
    let storage = SignedUrlIssuer::new(&config.storage)
        .context("set storage.signing_secret or auth.secret to sign paper URLs")?;

    Ok(AssessmentService::new(
        store.clone(),
        Arc::new(LatexRenderer::new(config.renderer.output_dir.clone())),
        Arc::new(storage),
        Arc::new(StoreCourseDirectory::new(store)),
    ))
}

async fn build_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store, data is lost on exit");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Mongo => connect_mongo(config).await,
    }
}

#[cfg(feature = "mongo")]
async fn connect_mongo(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    let store = assessments_core::MongoDocumentStore::connect(&config.uri, &config.database).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo"))]
async fn connect_mongo(_config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    bail!("store.backend = \"mongo\" requires building with the `mongo` feature")
}
