use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Action, ActionEntry, EntryStatus};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct EnqueueAction {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub actor_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub status: Option<EntryStatus>,
}

/// Validates the intent, queues it, and answers before it is applied.
pub async fn enqueue(
    State(state): State<SharedState>,
    Json(req): Json<EnqueueAction>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let action = Action::decode(&req.kind, &req.payload)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let id = match req.actor_id.as_deref() {
        Some(actor_id) => state.client.write_as(action, actor_id).await?,
        None => state.client.write(action).await?,
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "id": id, "kind": req.kind, "status": EntryStatus::Pending })),
    ))
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ActionEntry>>, AppError> {
    let entries = state.client.entries(params.status).await?;
    Ok(Json(entries))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionEntry>, AppError> {
    let entry = state
        .client
        .entry(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Action not found".to_string()))?;
    Ok(Json(entry))
}

pub async fn dequeue(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.client.dequeue(id).await? {
        return Ok(Json(json!({ "dequeued": true })));
    }

    match state.client.entry(id).await? {
        Some(entry) => Err(AppError::Conflict(format!(
            "Action is {} and can no longer be dequeued",
            entry.status
        ))),
        None => Err(AppError::NotFound("Action not found".to_string())),
    }
}
