use axum::Json;
use axum::extract::State;
use serde_json::json;

use crate::error::AppError;
use crate::models::QueueStatus;
use crate::queue::PassReport;
use crate::state::SharedState;

pub async fn status(State(state): State<SharedState>) -> Result<Json<QueueStatus>, AppError> {
    Ok(Json(state.client.queue_status().await?))
}

pub async fn replay(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let replayed = state.client.replay_failed_actions().await?;
    Ok(Json(json!({ "replayed": replayed })))
}

pub async fn clear(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cleared = state.client.clear_completed_actions().await?;
    Ok(Json(json!({ "cleared": cleared })))
}

pub async fn flush(State(state): State<SharedState>) -> Result<Json<PassReport>, AppError> {
    Ok(Json(state.client.flush().await?))
}
