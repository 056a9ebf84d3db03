//! HTTP surface: the WebSocket endpoint plus the static page.

use axum::routing::get;
use axum::Router;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::ws::{ws_handler, AppState};

/// `/ws` for game traffic, everything else served from `web_root`.
pub fn build_router(app_state: AppState, web_root: &Path) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(web_root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
