use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use taskboard_types::TaskType;
use taskboard_types::api::MessageResponse;

use crate::error::{ApiError, Entity};
use crate::service::TaskTypeService;
use crate::validate::{self, parse_id};
use crate::{AppState, blocking};

#[tracing::instrument(skip(state))]
pub async fn list_task_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskType>>, ApiError> {
    let types = blocking(&state, |db| TaskTypeService::new(db).list()).await?;
    Ok(Json(types))
}

#[tracing::instrument(skip(state))]
pub async fn get_task_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskType>, ApiError> {
    let id = parse_id(&id, Entity::TaskType)?;

    blocking(&state, move |db| TaskTypeService::new(db).get(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(Entity::TaskType))
}

#[tracing::instrument(skip_all)]
pub async fn create_task_type(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let req = validate::task_types::create(&body)?;

    let created = blocking(&state, move |db| TaskTypeService::new(db).create(&req)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(skip(state, body))]
pub async fn update_task_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TaskType>, ApiError> {
    let id = parse_id(&id, Entity::TaskType)?;
    let Json(body) = body?;
    let patch = validate::task_types::update(&body)?;

    blocking(&state, move |db| TaskTypeService::new(db).update(id, &patch))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(Entity::TaskType))
}

#[tracing::instrument(skip(state))]
pub async fn delete_task_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, Entity::TaskType)?;

    if !blocking(&state, move |db| TaskTypeService::new(db).delete(id)).await? {
        return Err(ApiError::NotFound(Entity::TaskType));
    }
    Ok(Json(MessageResponse {
        message: "Task type deleted successfully".into(),
    }))
}
