use axum::Json;
use axum::extract::{Path, State};

use crate::error::AppError;
use crate::models::{Entity, EntityKind};
use crate::state::SharedState;

fn parse_kind(kind: &str) -> Result<EntityKind, AppError> {
    kind.parse().map_err(AppError::NotFound)
}

pub async fn list(
    State(state): State<SharedState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Entity>>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.client.read_all(kind).await?))
}

pub async fn get(
    State(state): State<SharedState>,
    Path((kind, key)): Path<(String, String)>,
) -> Result<Json<Entity>, AppError> {
    let kind = parse_kind(&kind)?;
    let entity = state
        .client
        .read(kind, &key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No {kind} with key {key}")))?;
    Ok(Json(entity))
}
