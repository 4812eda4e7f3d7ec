//! emosense-gw - API Gateway entry point
//!
//! Listens on a local port and forwards `/api`-prefixed requests to the
//! emotion-classification service with the prefix removed, attaching
//! permissive CORS headers so browser front-ends on other origins can
//! reach the service.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emosense_gw::{build_router, AppState};

/// Command-line arguments for emosense-gw
#[derive(Parser, Debug)]
#[command(name = "emosense-gw")]
#[command(about = "API gateway for the emosense front-end")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3001", env = "EMOSENSE_GW_PORT")]
    port: u16,

    /// Upstream inference service origin
    #[arg(short, long, env = "EMOSENSE_UPSTREAM_URL")]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emosense_gw=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting emosense gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse command-line arguments
    let args = Args::parse();

    // Fall back to the shared service-address resolution when no explicit
    // upstream was given (environment, config file, compiled default).
    let upstream = emosense_common::config::resolve_service_url(args.upstream.as_deref());
    info!("Upstream inference service: {}", upstream);

    let state = AppState::new(upstream);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
