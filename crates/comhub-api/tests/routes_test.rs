//! Envelope, routing and query/body rejection behavior.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_health_is_wrapped_in_data() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_sort_field_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/v1/events?sort=password:asc", None, None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_SORT");
}

#[tokio::test]
async fn test_inverted_time_range_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request(
            "GET",
            "/api/v1/events?from=2025-06-01T00:00:00Z&to=2025-05-01T00:00:00Z",
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_FILTER");
}

#[tokio::test]
async fn test_malformed_query_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/v1/partners?tier=diamond", None, None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_QUERY");
}

#[tokio::test]
async fn test_invalid_path_id() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/events/not-a-uuid/registrations",
            Some(json!({ "email": "ana@example.org", "full_name": "Ana" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ID");
}

#[tokio::test]
async fn test_registration_form_is_validated() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            &format!("/api/v1/events/{}/registrations", uuid::Uuid::new_v4()),
            Some(json!({ "email": "ana", "full_name": "" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let details = &response.body["error"]["details"];
    assert!(details["email"].is_array());
    assert!(details["full_name"].is_array());
}

#[tokio::test]
async fn test_body_without_json_content_type() {
    let app = TestApp::new();

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .body(Body::from(r#"{"email":"a@example.org","password":"x"}"#))
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "UNSUPPORTED_MEDIA_TYPE");
}

#[tokio::test]
async fn test_wrongly_typed_body_field() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": 42, "password": "x" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error_code(), "INVALID_BODY");
}

#[tokio::test]
async fn test_admin_list_rejects_unknown_sort() {
    let app = TestApp::new();
    let tokens = app.login_with(&["users:read"]).await;

    let response = app
        .request(
            "GET",
            "/api/v1/admin/users?sort=password_hash:asc",
            None,
            Some(&tokens.access_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_SORT");
}
