use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mockapi_db::{DbRuntimeSettings, StorageHandle};
use mockapi_records::run_seeds;
use mockapi_server::{app, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

fn setup_app() -> (axum::Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let storage = StorageHandle::new(dir.path().join("api.db"), DbRuntimeSettings::default());
    run_seeds(&storage).unwrap();
    (app(AppState::sqlite(storage)), dir)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_list_users() {
    let (app, _dir) = setup_app();

    let (status, json) = send(&app, get("/users/")).await;
    assert_eq!(status, StatusCode::OK);
    let users = json.as_array().unwrap();
    assert_eq!(users.len(), 5);
    assert_eq!(users[0]["email"], "alice@example.com");

    // Same collection without the trailing slash.
    let (status, json) = send(&app, get("/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_get_user() {
    let (app, _dir) = setup_app();

    let (status, json) = send(&app, get("/users/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 2);
    assert_eq!(json["name"], "Bob Wilson");
    assert_eq!(json["age"], 34);
    assert!(json["created_at"].is_string());
}

#[tokio::test]
async fn test_get_missing_user_returns_404() {
    let (app, _dir) = setup_app();

    let (status, json) = send(&app, get("/users/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "User not found");
}

#[tokio::test]
async fn test_get_user_with_non_numeric_id_is_rejected() {
    let (app, _dir) = setup_app();

    let response = app.oneshot(get("/users/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_user() {
    let (app, _dir) = setup_app();

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/users/",
            json!({"name": "Z", "email": "z@example.com", "age": 40}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 6);
    assert_eq!(json["email"], "z@example.com");

    let (status, json) = send(&app, get("/users/6")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Z");
}

#[tokio::test]
async fn test_create_user_from_query_parameters() {
    let (app, _dir) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/users/?name=Z&email=z%40example.com&age=40")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 6);
    assert_eq!(json["email"], "z@example.com");
    assert_eq!(json["age"], 40);

    let (status, json) = send(&app, get("/users/6")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Z");
}

#[tokio::test]
async fn test_create_user_query_form_reports_conflicts_and_missing_fields() {
    let app = app(AppState::in_memory());

    let duplicate = Request::builder()
        .method("POST")
        .uri("/users/?name=J&email=john%40example.com&age=20")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, duplicate).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let missing_age = Request::builder()
        .method("POST")
        .uri("/users/?name=J&email=j%40example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(missing_age).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_user_duplicate_email_returns_409() {
    let (app, _dir) = setup_app();

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/users/",
            json!({"name": "Alice Again", "email": "alice@example.com", "age": 50}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("users.email"));

    let (_, json) = send(&app, get("/users/")).await;
    let matching = json
        .as_array()
        .unwrap()
        .iter()
        .filter(|u| u["email"] == "alice@example.com")
        .count();
    assert_eq!(matching, 1);
}

#[tokio::test]
async fn test_create_user_missing_field_is_rejected() {
    let (app, _dir) = setup_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/users/",
            json!({"name": "No Email", "age": 20}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_user() {
    let (app, _dir) = setup_app();

    let (status, json) = send(
        &app,
        json_request("PATCH", "/users/1", json!({"age": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["age"], 30);
    assert_eq!(json["name"], "Alice Johnson");

    let (status, _) = send(
        &app,
        json_request("PATCH", "/users/1", json!({"email": "bob@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        json_request("PATCH", "/users/404", json!({"age": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_in_memory_backend_serves_demo_users() {
    let app = app(AppState::in_memory());

    let (status, json) = send(&app, get("/users/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 3);

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/users/",
            json!({"name": "Z", "email": "z@example.com", "age": 40}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 4);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/users/",
            json!({"name": "Z", "email": "z@example.com", "age": 40}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_store_failure_returns_500() {
    let dir = TempDir::new().unwrap();
    // Tables are never created, so every query fails.
    let storage = StorageHandle::new(dir.path().join("empty.db"), DbRuntimeSettings::default());
    let app = app(AppState::sqlite(storage));

    let (status, json) = send(&app, get("/users/")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());
}
