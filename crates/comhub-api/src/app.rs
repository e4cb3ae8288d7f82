//! Application builder: wires router, middleware and state into an Axum app.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use sqlx::PgPool;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use comhub_auth::TokenSweeper;
use comhub_cache::CacheManager;
use comhub_core::config::AppConfig;
use comhub_core::error::AppError;
use comhub_database::repositories::{RefreshTokenRepository, RoleRepository};

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds.max(1));
    let body_limit = state.config.server.max_body_bytes;
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(build_compression_layer())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
}

/// Application state backed by Postgres for refresh tokens and grants.
pub fn build_state(config: AppConfig, db_pool: PgPool, cache: CacheManager) -> AppState {
    let token_store = Arc::new(RefreshTokenRepository::new(db_pool.clone()));
    let grant_source = Arc::new(RoleRepository::new(db_pool.clone()));
    AppState::new(config, db_pool, cache, token_store, grant_source)
}

/// Runs the ComHub server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    info!("Starting ComHub server...");

    // ── Step 1: Initialize cache ─────────────────────────────────
    info!(provider = %config.cache.provider, "Initializing cache");
    let cache = CacheManager::new(&config.cache).await?;

    // ── Step 2: Shutdown channel & token sweeper ─────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = TokenSweeper::new(
        &config.auth,
        Arc::new(RefreshTokenRepository::new(db_pool.clone())),
    )
    .spawn(shutdown_rx);

    // ── Step 3: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = build_app(build_state(config, db_pool, cache));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "ComHub server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 4: Stop background work ─────────────────────────────
    let _ = shutdown_tx.send(true);
    if tokio::time::timeout(grace, sweeper).await.is_err() {
        warn!(grace_secs = grace.as_secs(), "Token sweeper did not stop in time");
    }

    info!("ComHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
