use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use taskboard_types::api::{
    CreateTaskRequest, CreateTaskTypeRequest, CreateUserRequest, ErrorResponse, HealthResponse,
    MessageResponse, TaskFilter, UpdateTaskRequest, UpdateTaskTypeRequest, UpdateUserRequest,
};
use taskboard_types::{Task, TaskType, User};
use tracing::debug;

use crate::error::ClientError;

/// Typed wrapper over the REST API. Cheap to clone; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct TaskboardClient {
    base_url: String,
    http: Client,
}

impl TaskboardClient {
    /// `base_url` is the server root, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, Client::new())
    }

    pub fn with_http(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(self.http.get(self.url("/health"))).await
    }

    // -- Tasks --

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ClientError> {
        self.send(self.http.get(self.url("/api/tasks")).query(filter))
            .await
    }

    pub async fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/tasks/{id}"))))
            .await
    }

    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<Task, ClientError> {
        self.send(self.http.post(self.url("/api/tasks")).json(req))
            .await
    }

    pub async fn update_task(
        &self,
        id: i64,
        patch: &UpdateTaskRequest,
    ) -> Result<Task, ClientError> {
        self.send(self.http.put(self.url(&format!("/api/tasks/{id}"))).json(patch))
            .await
    }

    pub async fn delete_task(&self, id: i64) -> Result<MessageResponse, ClientError> {
        self.send(self.http.delete(self.url(&format!("/api/tasks/{id}"))))
            .await
    }

    // -- Task types --

    pub async fn list_task_types(&self) -> Result<Vec<TaskType>, ClientError> {
        self.send(self.http.get(self.url("/api/task-types"))).await
    }

    pub async fn get_task_type(&self, id: i64) -> Result<TaskType, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/task-types/{id}"))))
            .await
    }

    pub async fn create_task_type(
        &self,
        req: &CreateTaskTypeRequest,
    ) -> Result<TaskType, ClientError> {
        self.send(self.http.post(self.url("/api/task-types")).json(req))
            .await
    }

    pub async fn update_task_type(
        &self,
        id: i64,
        patch: &UpdateTaskTypeRequest,
    ) -> Result<TaskType, ClientError> {
        self.send(
            self.http
                .put(self.url(&format!("/api/task-types/{id}")))
                .json(patch),
        )
        .await
    }

    pub async fn delete_task_type(&self, id: i64) -> Result<MessageResponse, ClientError> {
        self.send(self.http.delete(self.url(&format!("/api/task-types/{id}"))))
            .await
    }

    // -- Users --

    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.send(self.http.get(self.url("/api/users"))).await
    }

    pub async fn get_user(&self, id: i64) -> Result<User, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/users/{id}"))))
            .await
    }

    pub async fn create_user(&self, req: &CreateUserRequest) -> Result<User, ClientError> {
        self.send(self.http.post(self.url("/api/users")).json(req))
            .await
    }

    pub async fn update_user(
        &self,
        id: i64,
        patch: &UpdateUserRequest,
    ) -> Result<User, ClientError> {
        self.send(self.http.put(self.url(&format!("/api/users/{id}"))).json(patch))
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<MessageResponse, ClientError> {
        self.send(self.http.delete(self.url(&format!("/api/users/{id}"))))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Error bodies are JSON from the API, but a proxy in between may not be.
        let (message, details) = match response.json::<ErrorResponse>().await {
            Ok(body) => (body.error, body.details.unwrap_or_default()),
            Err(_) => (
                status.canonical_reason().unwrap_or("Unknown error").to_string(),
                Vec::new(),
            ),
        };
        debug!(status = status.as_u16(), %message, "API request rejected");

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            details,
        })
    }
}
