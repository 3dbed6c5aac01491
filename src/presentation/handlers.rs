// HTTP request handlers
use crate::application::poller::PollerStopped;
use crate::application::status_sink::Notice;
use crate::infrastructure::status_board::StatusSnapshot;
use crate::presentation::app_state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct ReloadResponse {
    pub update_interval_secs: u64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current widget state: text, colour, warning band and recent notices
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.board.snapshot())
}

/// Refresh now and report the timestamp of the last entry
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<Json<Notice>, StatusCode> {
    if !state.poller.is_active() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    match state.poller.refresh().await {
        Ok(notice) => Ok(Json(notice)),
        Err(e) => {
            tracing::warn!("Refresh requested but {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Re-read the configuration file. A stopped poller is 503 like `/refresh`;
/// a bad file is 400 and the previous settings stay in force.
pub async fn reload(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !state.poller.is_active() {
        return Err(unavailable(&PollerStopped));
    }
    match state.poller.reload().await {
        Ok(settings) => Ok(Json(ReloadResponse {
            update_interval_secs: settings.update_interval.as_secs(),
        })),
        Err(e) => match e.downcast_ref::<PollerStopped>() {
            Some(stopped) => Err(unavailable(stopped)),
            None => {
                tracing::error!("Configuration reload failed: {:#}", e);
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("{:#}", e),
                    }),
                ))
            }
        },
    }
}

fn unavailable(stopped: &PollerStopped) -> (StatusCode, Json<ErrorResponse>) {
    tracing::warn!("Reload requested but {}", stopped);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: stopped.to_string(),
        }),
    )
}
