mod handlers;
mod state;

use axum::Router;
use axum::routing::get;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;

pub fn build_router(config: AppConfig) -> Router {
    let state = Arc::new(AppState { config });

    Router::new()
        .route("/api/location", get(handlers::location))
        .route("/api/distance", get(handlers::distance))
        .route("/api/hours", get(handlers::hours))
        .route("/api/card", get(handlers::card))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(config: AppConfig, host: &str, port: u16) {
    let app = build_router(config);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!(%addr, "server listening");
    eprintln!("  Cafe Locator API listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}
