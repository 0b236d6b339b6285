use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::websocket::websocket_handler;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // WebSocket
        .route("/ws", get(websocket_handler))
        // Health check
        .route("/", get(health_check))
}

/// Full application: routes, permissive CORS for the browser client, and
/// request tracing.
pub fn create_app(state: AppState) -> Router {
    create_routes()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
