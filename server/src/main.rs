//! # server
//!
//! HTTP API of the video-sharing platform: videos, comments, likes,
//! playlists, subscriptions, tweets and the channel dashboard, served as JSON
//! under `/api/v1` with locally hosted media under `/media`.

mod app;
mod config;

use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use datastore::{InMemoryRepository, Repository};
use media_host::{LocalMediaHost, MediaHost, UploadStaging};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,server=debug")),
        )
        .init();

    info!("Starting video platform API v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------
    let repo: Arc<dyn Repository> = if config.seed_demo_data {
        Arc::new(InMemoryRepository::with_demo_data()?)
    } else {
        Arc::new(InMemoryRepository::new())
    };

    let tokens = Arc::new(auth_service::TokenStore::new(config.token_ttl_secs));

    let media: Arc<dyn MediaHost> = Arc::new(
        LocalMediaHost::new(config.media_root.clone(), config.public_base_url.clone()).await?,
    );
    let staging = UploadStaging::new(config.upload_staging_dir.clone()).await?;

    let router = app::build_router(
        AppState {
            repo,
            tokens: Arc::clone(&tokens),
            media,
            staging,
        },
        &config,
    );

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Expired token cleanup (every 5 minutes)
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            let purged = tokens.purge_expired();
            if purged > 0 {
                debug!(purged, "Purged expired access tokens");
            }
        }
    });

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down");
                shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
            }
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl+C"),
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    let addr = config.http_addr;
    match config.tls_paths() {
        Some((cert, key)) => {
            // ring is the only provider compiled in; a second install is a no-op
            let _ = rustls::crypto::ring::default_provider().install_default();
            let tls = RustlsConfig::from_pem_file(cert, key).await?;

            info!(%addr, "HTTPS API listening");
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(router.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, "HTTP API listening");
            axum_server::bind(addr)
                .handle(handle)
                .serve(router.into_make_service())
                .await?;
        }
    }

    info!("Server stopped");
    Ok(())
}
