//! Detection engine (vsd-engine) - Main entry point
//!
//! Hosts the batch detection jobs, live monitoring sessions, and the
//! alert stream behind a REST API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vsd_common::hub::{AlertHub, DEFAULT_QUEUE_DEPTH};
use vsd_engine::capture::{CaptureSource, FsCaptureSource};
use vsd_engine::classify::{FrameClassifier, RemoteClassifier, StubClassifier};
use vsd_engine::config::{ConfigOverrides, EngineConfig};
use vsd_engine::db::init_database;
use vsd_engine::evidence::EvidenceStore;
use vsd_engine::jobs::JobEngine;
use vsd_engine::monitor::MonitorRegistry;
use vsd_engine::{build_router, AppState};

/// Command-line arguments for vsd-engine
#[derive(Parser, Debug)]
#[command(name = "vsd-engine")]
#[command(about = "Smoking/vaping detection engine")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "VSD_PORT")]
    port: Option<u16>,

    /// Data directory (database, evidence artifacts)
    #[arg(short, long, env = "VSD_DATA_DIR")]
    data_dir: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remote classifier endpoint (omit to use the built-in stub)
    #[arg(long, env = "VSD_CLASSIFIER_ENDPOINT")]
    classifier_endpoint: Option<String>,

    /// Root directory for capture target spools
    #[arg(long, env = "VSD_CAPTURE_DIR")]
    capture_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vsd_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = EngineConfig::resolve(ConfigOverrides {
        port: args.port,
        data_dir: args.data_dir,
        config_file: args.config,
        classifier_endpoint: args.classifier_endpoint,
        capture_dir: args.capture_dir,
    })
    .context("Failed to resolve configuration")?;

    info!("Starting VSD detection engine on port {}", config.port);
    info!("Data directory: {}", config.data_dir.display());

    let pool = init_database(&config.db_path)
        .await
        .context("Failed to initialize database")?;

    let hub = AlertHub::new(DEFAULT_QUEUE_DEPTH);

    let classifier: Arc<dyn FrameClassifier> = match &config.classifier_endpoint {
        Some(endpoint) => {
            info!("Using remote classifier at {}", endpoint);
            Arc::new(
                RemoteClassifier::new(endpoint.clone())
                    .context("Failed to create classifier client")?,
            )
        }
        None => {
            info!("No classifier endpoint configured; using stub classifier");
            Arc::new(StubClassifier::new())
        }
    };

    let capture: Arc<dyn CaptureSource> = Arc::new(FsCaptureSource::new(&config.capture_dir));
    let evidence = Arc::new(EvidenceStore::new(&config.evidence_dir));

    let registry = Arc::new(MonitorRegistry::new(
        Arc::clone(&classifier),
        capture,
        evidence,
        hub.clone(),
        pool.clone(),
    ));
    let jobs = Arc::new(JobEngine::new(pool.clone(), Arc::clone(&classifier)));

    let state = AppState::new(
        pool,
        hub,
        Arc::clone(&registry),
        jobs,
        classifier,
    );
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Sessions keep capture loops running; stop them before exit.
    registry.stop_all().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
