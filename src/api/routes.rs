use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{health, playback, recording};
use super::state::AppState;
use super::websocket::ws_handler;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Only local tooling talks to the recorder
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://127.0.0.1:5173"),
            HeaderValue::from_static("http://localhost:8765"),
            HeaderValue::from_static("http://127.0.0.1:8765"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Recording sessions
        .route("/recordings", post(recording::create_recording))
        .route(
            "/recordings/:session_id",
            get(recording::get_recording_status).delete(recording::delete_recording),
        )
        .route("/recordings/:session_id/events", post(recording::post_events))
        .route(
            "/recordings/:session_id/context-command",
            post(recording::context_command),
        )
        .route(
            "/recordings/:session_id/frame-location/recalculate",
            post(recording::recalculate_frame_location),
        )
        .route(
            "/recordings/:session_id/detach",
            post(recording::detach_recording),
        )
        // Playback
        .route("/playback/plan", post(playback::plan_playback))
        // WebSocket
        .route("/ws/:client_id", get(ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
