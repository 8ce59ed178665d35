//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    controller::PopupView,
    error::PopupError,
    services::{Command, Response},
    state::{AppState, Badge},
    store::{SessionRecord, StoreSnapshot},
};
use super::responses::{HealthResponse, StatusResponse, TotalResponse};

type PopupResult = Result<Json<PopupView>, StatusCode>;

fn popup_reply(state: &AppState, action: &str, result: Result<PopupView, PopupError>) -> PopupResult {
    match result {
        Ok(view) => {
            state.record_action(action);
            Ok(Json(view))
        }
        Err(e) => {
            error!("Popup {} failed: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /command - Timer command channel
pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    Json(command): Json<Command>,
) -> Result<Json<Option<Response>>, StatusCode> {
    match state.timer.send(command).await {
        Ok(response) => {
            if command != Command::GetTime {
                info!("Command endpoint called - {}", command.name());
                state.record_action(command.name());
            }
            Ok(Json(response))
        }
        Err(e) => {
            error!("Failed to deliver {} command: {}", command.name(), e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /badge - Current badge text and colour
pub async fn badge_handler(State(state): State<Arc<AppState>>) -> Json<Badge> {
    Json(state.badge())
}

/// Handle GET /records - Stored sessions, newest first
pub async fn records_handler(State(state): State<Arc<AppState>>) -> Json<Vec<SessionRecord>> {
    Json(state.store.records())
}

/// Handle GET /total - Cumulative total in seconds
pub async fn total_handler(State(state): State<Arc<AppState>>) -> Json<TotalResponse> {
    Json(TotalResponse {
        total_time: state.store.get_total(),
    })
}

/// Handle DELETE /records/:timestamp - Delete a session and adjust the total
pub async fn delete_record_handler(
    State(state): State<Arc<AppState>>,
    Path(timestamp): Path<i64>,
) -> Result<Json<StoreSnapshot>, StatusCode> {
    match state.store.delete_record(timestamp) {
        Ok(snapshot) => {
            state.record_action("delete-record");
            Ok(Json(snapshot))
        }
        Err(e) => {
            error!("Failed to delete record {}: {}", timestamp, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /popup - Current popup view
pub async fn popup_view_handler(State(state): State<Arc<AppState>>) -> Json<PopupView> {
    Json(state.popup.view())
}

/// Handle POST /popup/open - Load saved data and resume a running timer
pub async fn popup_open_handler(State(state): State<Arc<AppState>>) -> PopupResult {
    let result = state.popup.open().await;
    popup_reply(&state, "popup-open", result)
}

/// Handle POST /popup/toggle - Start/stop button
pub async fn popup_toggle_handler(State(state): State<Arc<AppState>>) -> PopupResult {
    let result = state.popup.toggle().await;
    popup_reply(&state, "popup-toggle", result)
}

/// Handle POST /popup/start - Start the timer from the popup
pub async fn popup_start_handler(State(state): State<Arc<AppState>>) -> PopupResult {
    let result = state.popup.start().await;
    popup_reply(&state, "popup-start", result)
}

/// Handle POST /popup/stop - Stop the timer and record the session
pub async fn popup_stop_handler(State(state): State<Arc<AppState>>) -> PopupResult {
    let result = state.popup.stop().await;
    popup_reply(&state, "popup-stop", result)
}

/// Handle POST /popup/reset - Reset the timer and clear history
pub async fn popup_reset_handler(State(state): State<Arc<AppState>>) -> PopupResult {
    let result = state.popup.reset().await;
    popup_reply(&state, "popup-reset", result)
}

/// Handle POST /popup/close - Stop display polling
pub async fn popup_close_handler(State(state): State<Arc<AppState>>) -> Json<PopupView> {
    state.popup.close();
    Json(state.popup.view())
}

/// Handle DELETE /popup/records/:timestamp - Delete button on a history row
pub async fn popup_delete_record_handler(
    State(state): State<Arc<AppState>>,
    Path(timestamp): Path<i64>,
) -> PopupResult {
    let result = state.popup.delete_record(timestamp).await;
    popup_reply(&state, "popup-delete-record", result)
}

/// Handle GET /status - Return current timer and history status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.timer.get_time().await {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let snapshot = state.store.snapshot();
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        badge: state.badge(),
        total_time: snapshot.total_time,
        record_count: snapshot.records.len(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
