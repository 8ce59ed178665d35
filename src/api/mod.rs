//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/command", post(command_handler))
        .route("/badge", get(badge_handler))
        .route("/records", get(records_handler))
        .route("/records/:timestamp", delete(delete_record_handler))
        .route("/total", get(total_handler))
        // Popup hosted by this process
        .route("/popup", get(popup_view_handler))
        .route("/popup/open", post(popup_open_handler))
        .route("/popup/toggle", post(popup_toggle_handler))
        .route("/popup/start", post(popup_start_handler))
        .route("/popup/stop", post(popup_stop_handler))
        .route("/popup/reset", post(popup_reset_handler))
        .route("/popup/close", post(popup_close_handler))
        .route("/popup/records/:timestamp", delete(popup_delete_record_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
