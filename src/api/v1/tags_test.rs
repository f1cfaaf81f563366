//! Integration tests for tag endpoints.

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

#[tokio::test(flavor = "multi_thread")]
async fn create_tag_defaults_color() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/tags",
            &token,
            Some(&json!({"name": "errands"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["name"], "errands");
    assert_eq!(body["color"], "#3B82F6");
}

#[tokio::test(flavor = "multi_thread")]
async fn create_tag_rejects_bad_color() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    for color in ["3B82F6", "#3B82F", "#GGGGGG", "#3B82F6FF"] {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/tags",
                &token,
                Some(&json!({"name": "bad", "color": color})),
            ))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "accepted {color}"
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_name_limit_counts_characters_not_bytes() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    // 40 characters but 80 bytes: within the 50-character cap
    let name = "ü".repeat(40);
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/tags",
            &token,
            Some(&json!({"name": name})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["name"], name);

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/tags",
            &token,
            Some(&json!({"name": "ü".repeat(51)})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Tag name must be 50 characters or less");
}

#[tokio::test(flavor = "multi_thread")]
async fn list_tags_is_sorted_and_scoped() {
    let app = test_app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    for name in ["zeta", "alpha"] {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/tags",
                &alice,
                Some(&json!({"name": name})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(request("GET", "/api/v1/tags", &alice, None))
        .await
        .unwrap();
    let body = json_body(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "zeta"]);

    let response = app
        .oneshot(request("GET", "/api/v1/tags", &bob, None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn update_and_delete_tag() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/tags",
            &token,
            Some(&json!({"name": "work"})),
        ))
        .await
        .unwrap();
    let created = json_body(response).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/tags/{id}"),
            &token,
            Some(&json!({"color": "#10B981"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["name"], "work");
    assert_eq!(body["color"], "#10B981");

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/v1/tags/{id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("GET", &format!("/api/v1/tags/{id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Tag not found");
}

#[tokio::test(flavor = "multi_thread")]
async fn other_users_tags_are_not_found() {
    let app = test_app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/tags",
            &alice,
            Some(&json!({"name": "mine"})),
        ))
        .await
        .unwrap();
    let created = json_body(response).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(request("GET", &format!("/api/v1/tags/{id}"), &bob, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
