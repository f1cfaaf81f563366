//! Integration tests for todo endpoints.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::{AppState, routes};
use crate::auth::{AuthConfig, AuthService};
use crate::db::SqliteDatabase;

async fn test_app() -> axum::Router {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");

    let auth = AuthService::new(AuthConfig {
        jwt_secret: "test-secret".to_string(),
        ..Default::default()
    });
    routes::create_router(AppState::new(db, auth))
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Register an account and return its bearer token.
async fn register(app: &axum::Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"email": email, "password": "Valid123x"}))
                        .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    body["access_token"].as_str().unwrap().to_string()
}

fn request(method: &str, uri: &str, token: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json");
    match body {
        Some(b) => builder
            .body(Body::from(serde_json::to_vec(b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn create_todo(app: &axum::Router, token: &str, title: &str) -> Value {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/todos",
            token,
            Some(&json!({"title": title})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

#[tokio::test(flavor = "multi_thread")]
async fn todos_require_authentication() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/todos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Missing authentication token");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/todos")
                .header("authorization", "Bearer garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid authentication token");
}

#[tokio::test(flavor = "multi_thread")]
async fn create_and_get_todo() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    let created = create_todo(&app, &token, "Buy milk").await;
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["completed"], false);
    assert_eq!(created["priority"], "medium");
    let id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(request("GET", &format!("/api/v1/todos/{id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], created["id"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_empty_title() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/todos",
            &token,
            Some(&json!({"title": "   "})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Title must not be empty");
}

#[tokio::test(flavor = "multi_thread")]
async fn title_limit_counts_characters_not_bytes() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    // 300 characters but 600 bytes: within the 500-character cap
    let title = "é".repeat(300);
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/todos",
            &token,
            Some(&json!({"title": title})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["title"], title);

    // 501 characters is still over the cap
    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/todos",
            &token,
            Some(&json!({"title": "é".repeat(501)})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Title must be 500 characters or less");
}

#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_malformed_due_date() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/todos",
            &token,
            Some(&json!({"title": "Dated", "due_date": "01-09-2026"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_reports_pagination_metadata() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    for i in 0..3 {
        create_todo(&app, &token, &format!("Todo {i}")).await;
    }

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/todos?page=1&page_size=2",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["todos"].as_array().unwrap().len(), 2);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["total_pages"], 2);

    // Empty result still reports one page
    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/todos?search=nomatch",
            &token,
            None,
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["total_pages"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_rejects_out_of_range_page_size() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/todos?page_size=101",
            &token,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Page size must be between 1 and 100");
}

#[tokio::test(flavor = "multi_thread")]
async fn update_and_patch_status() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    let created = create_todo(&app, &token, "Original").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/todos/{id}"),
            &token,
            Some(&json!({"title": "Renamed", "priority": "high"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["priority"], "high");

    let response = app
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/todos/{id}/status"),
            &token,
            Some(&json!({"completed": true})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["completed"], true);
    assert_eq!(body["title"], "Renamed");
}

#[tokio::test(flavor = "multi_thread")]
async fn other_users_todos_are_not_found() {
    let app = test_app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let created = create_todo(&app, &alice, "Alice's").await;
    let id = created["id"].as_str().unwrap();

    for (method, body) in [
        ("GET", None),
        ("PUT", Some(json!({"title": "Hijacked"}))),
        ("DELETE", None),
    ] {
        let response = app
            .clone()
            .oneshot(request(
                method,
                &format!("/api/v1/todos/{id}"),
                &bob,
                body.as_ref(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} leaked");
    }

    // Still present for the owner
    let response = app
        .oneshot(request("GET", &format!("/api/v1/todos/{id}"), &alice, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_returns_no_content_then_not_found() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    let created = create_todo(&app, &token, "Doomed").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/v1/todos/{id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("DELETE", &format!("/api/v1/todos/{id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
