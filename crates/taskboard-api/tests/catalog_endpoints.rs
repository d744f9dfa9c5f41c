use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

mod common;

use common::{app, send};

#[tokio::test]
async fn task_type_lifecycle() {
    let app = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/task-types",
        Some(json!({ "name": "Story", "description": "User-facing work", "color": "#3366ff" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Story");
    let uri = format!("/api/task-types/{}", created["id"]);

    let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({ "color": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["color"], Value::Null);
    assert_eq!(updated["description"], "User-facing work");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task type deleted successfully");

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task type not found");
}

#[tokio::test]
async fn task_types_are_listed_by_name() {
    let app = app();
    for name in ["Story", "Bug", "Epic"] {
        send(&app, Method::POST, "/api/task-types", Some(json!({ "name": name }))).await;
    }

    let (status, listed) = send(&app, Method::GET, "/api/task-types", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bug", "Epic", "Story"]);
}

#[tokio::test]
async fn duplicate_task_type_name_conflicts() {
    let app = app();
    let body = json!({ "name": "Bug" });
    let (status, _) = send(&app, Method::POST, "/api/task-types", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = send(&app, Method::POST, "/api/task-types", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err, json!({ "error": "Task type name already exists" }));
}

#[tokio::test]
async fn bad_color_is_a_validation_error() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/task-types",
        Some(json!({ "name": "Bug", "color": "red" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        json!([{ "field": "color", "message": "Color must be a valid hex color" }])
    );
}

#[tokio::test]
async fn seeded_admin_is_listed_without_password() {
    let app = app();
    let (status, users) = send(&app, Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);

    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "admin");
    assert_eq!(users[0]["fullName"], "Administrator");
    assert!(users[0].get("password").is_none());
}

#[tokio::test]
async fn user_lifecycle() {
    let app = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({
            "username": "grace",
            "password": "hopper",
            "email": "grace@example.com",
            "fullName": "Grace Hopper"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("password").is_none());
    let uri = format!("/api/users/{}", created["id"]);

    let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({ "email": "" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], Value::Null);
    assert_eq!(updated["fullName"], "Grace Hopper");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "username": "admin", "password": "whatever" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn user_validation_reports_every_field() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "username": "x", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["username", "password", "email"]);
}

#[tokio::test]
async fn invalid_user_id() {
    let app = app();
    let (status, body) = send(&app, Method::DELETE, "/api/users/nope", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid user ID" }));
}
