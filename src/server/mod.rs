//! Loopback HTTP facade over the analysis engine.
//!
//! The editor extension is the only intended client; the server binds to
//! 127.0.0.1 and allows permissive CORS for the visualization webview.

mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::engine::Engine;

pub struct AppState {
    pub engine: Engine,
}

/// Build the application router. Split out from `serve` so tests can drive
/// the routes without binding a socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(routes::analyze))
        .route("/refresh", post(routes::refresh))
        .route("/symbols", get(routes::symbols))
        .route("/graph", get(routes::graph))
        .route("/save_diagnostics", post(routes::save_diagnostics))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the server on the loopback interface until interrupted.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        engine: Engine::new(),
    });
    let app = router(state);

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "snipe analysis server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
