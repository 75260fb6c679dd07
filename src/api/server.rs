use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{auth, pages};
use crate::config::Config;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

/// Build the full router. Any path or method not listed here falls through to
/// the JSON 404.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::home).fallback(pages::not_found))
        .route("/health", get(|| async { "OK" }).fallback(pages::not_found))
        .route("/signup", post(auth::signup).fallback(pages::not_found))
        .route("/signin", get(auth::signin).fallback(pages::not_found))
        .fallback(pages::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: &Config) -> Result<()> {
    let pool = db::connect(&config.database_url, config.max_connections)
        .await
        .context("Failed to open user store")?;

    let state = Arc::new(AppState { db: pool.clone() });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Server running on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    // In-flight requests have drained; release the store last.
    pool.close().await;
    info!("Gracefully shutdown");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
}
