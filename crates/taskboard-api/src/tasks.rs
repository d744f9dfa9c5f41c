use std::collections::HashMap;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use taskboard_types::Task;
use taskboard_types::api::MessageResponse;

use crate::error::{ApiError, Entity};
use crate::service::TaskService;
use crate::validate::{self, parse_id};
use crate::{AppState, blocking};

#[tracing::instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let Query(query) = query?;
    let filter = validate::tasks::filter(&query)?;

    let tasks = blocking(&state, move |db| TaskService::new(db).list(&filter)).await?;
    Ok(Json(tasks))
}

#[tracing::instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id, Entity::Task)?;

    blocking(&state, move |db| TaskService::new(db).get(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(Entity::Task))
}

#[tracing::instrument(skip_all)]
pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let req = validate::tasks::create(&body)?;

    let task = blocking(&state, move |db| TaskService::new(db).create(&req)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[tracing::instrument(skip(state, body))]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id, Entity::Task)?;
    let Json(body) = body?;
    let patch = validate::tasks::update(&body)?;

    blocking(&state, move |db| TaskService::new(db).update(id, &patch))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(Entity::Task))
}

#[tracing::instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, Entity::Task)?;

    if !blocking(&state, move |db| TaskService::new(db).delete(id)).await? {
        return Err(ApiError::NotFound(Entity::Task));
    }
    Ok(Json(MessageResponse {
        message: "Task deleted successfully".into(),
    }))
}
