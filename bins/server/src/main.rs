//! Filedrop Server
//!
//! Main entry point for the Filedrop upload service.

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filedrop_api::{AppState, cors_layer, create_router};
use filedrop_core::retention::{RetentionPolicy, RetentionSweeper};
use filedrop_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filedrop=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Create application state
    let state = AppState::from_config(&config);

    // Uploads retry directory creation, so a failure here is not fatal
    if let Err(e) = state.uploads.placer().ensure_dir().await {
        error!(error = %e, "Storage directory not ready");
    }
    info!(
        dir = %config.storage.dir.display(),
        max_file_size = config.storage.max_file_size,
        allowed = ?config.storage.allowed_mime_types,
        "Storage configured"
    );

    // Start retention sweeper
    let shutdown = CancellationToken::new();
    let sweeper = RetentionSweeper::new(
        &config.storage.dir,
        RetentionPolicy::from_config(&config.retention),
    )
    .spawn(shutdown.clone());

    // Create router
    let cors = cors_layer(config.server.restricted_origin())?;
    let app = create_router(state, cors);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);
    info!("Upload endpoint: POST http://{}/upload", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop background work
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        error!(error = %e, "Retention sweeper task failed");
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
