use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use taskboard_types::User;
use taskboard_types::api::MessageResponse;

use crate::error::{ApiError, Entity};
use crate::service::UserService;
use crate::validate::{self, parse_id};
use crate::{AppState, blocking};

// `User` carries no password field, so nothing below can leak the stored hash.

#[tracing::instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = blocking(&state, |db| UserService::new(db).list()).await?;
    Ok(Json(users))
}

#[tracing::instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id, Entity::User)?;

    blocking(&state, move |db| UserService::new(db).get(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(Entity::User))
}

#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let req = validate::users::create(&body)?;

    let user = blocking(&state, move |db| UserService::new(db).create(&req)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[tracing::instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id, Entity::User)?;
    let Json(body) = body?;
    let patch = validate::users::update(&body)?;

    blocking(&state, move |db| UserService::new(db).update(id, &patch))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(Entity::User))
}

#[tracing::instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, Entity::User)?;

    if !blocking(&state, move |db| UserService::new(db).delete(id)).await? {
        return Err(ApiError::NotFound(Entity::User));
    }
    Ok(Json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}
