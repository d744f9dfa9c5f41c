use std::fmt;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use taskboard_types::api::{ErrorResponse, FieldError};
use tracing::{debug, error};

/// The resource a request addressed, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Task,
    TaskType,
    User,
}

impl Entity {
    fn noun(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::TaskType => "task type",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => f.write_str("Task"),
            Self::TaskType => f.write_str("Task type"),
            Self::User => f.write_str("User"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One entry per failing field.
    #[error("Validation error")]
    Validation(Vec<FieldError>),

    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),

    #[error("Invalid query parameters")]
    InvalidQuery(#[from] QueryRejection),

    #[error("Invalid {} ID", .0.noun())]
    InvalidId(Entity),

    #[error("{0} not found")]
    NotFound(Entity),

    #[error("{0}")]
    Conflict(&'static str),

    /// Anything unexpected. Details are logged, never returned.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    /// Unique violations become `Conflict(conflict)`, everything else stays internal.
    pub fn from_db(err: anyhow::Error, conflict: &'static str) -> Self {
        if taskboard_db::is_unique_violation(&err) {
            Self::Conflict(conflict)
        } else {
            Self::Internal(err)
        }
    }

    /// Task rows have no unique columns. A foreign key violation means a referenced
    /// type or user vanished between the check and the write.
    pub fn from_task_write(err: anyhow::Error) -> Self {
        if taskboard_db::is_foreign_key_violation(&err) {
            Self::field("references", "Referenced task type or user does not exist")
        } else {
            Self::Internal(err)
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::InvalidBody(_)
            | Self::InvalidQuery(_)
            | Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            Self::Validation(details) => Some(details.clone()),
            Self::InvalidBody(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                None
            }
            Self::InvalidQuery(rejection) => {
                debug!("Rejected query string: {}", rejection.body_text());
                None
            }
            Self::Internal(err) => {
                error!("Internal error: {:#}", err);
                None
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}
