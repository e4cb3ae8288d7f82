//! Bearer authentication, capabilities and the refresh-token lifecycle
//! over HTTP.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_admin_routes_require_a_bearer_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/admin/audit", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "MISSING_TOKEN");
    assert!(response.body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/v1/admin/users", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_capability_is_forbidden() {
    let app = TestApp::new();
    let tokens = app.login_with(&["events:read"]).await;

    let response = app
        .request("GET", "/api/v1/admin/audit", None, Some(&tokens.access_token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"]["details"]["required"], "audit:read");
}

#[tokio::test]
async fn test_refresh_token_can_be_used_once() {
    let app = TestApp::new();
    let tokens = app.login_with(&[]).await;
    let body = json!({ "refresh_token": tokens.refresh_token });

    let first = app
        .request("POST", "/api/v1/auth/refresh", Some(body.clone()), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let rotated = first.body["data"]["refresh_token"].as_str().unwrap();
    assert_ne!(rotated, tokens.refresh_token);
    assert!(first.body["data"]["access_token"].is_string());

    let replay = app
        .request("POST", "/api/v1/auth/refresh", Some(body), None)
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.error_code(), "TOKEN_REUSED");

    // the replay revoked the whole family, successor included
    let successor = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": rotated })),
            None,
        )
        .await;
    assert_eq!(successor.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_both_tokens() {
    let app = TestApp::new();
    let tokens = app.login_with(&["audit:read"]).await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/logout",
            Some(json!({ "refresh_token": tokens.refresh_token })),
            Some(&tokens.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let refresh = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": tokens.refresh_token })),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);

    let denied = app
        .request("GET", "/api/v1/admin/audit", None, Some(&tokens.access_token))
        .await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
    assert_eq!(denied.error_code(), "TOKEN_REVOKED");
}

#[tokio::test]
async fn test_new_token_reflects_changed_grants() {
    let app = TestApp::new();
    let tokens = app.login_with(&["events:read"]).await;
    let user_id = tokens.grants.user_id;

    app.grants.update(user_id, |g| g.permissions.push("audit:read".into()));

    let refreshed = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": tokens.refresh_token })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);

    let access = refreshed.body["data"]["access_token"].as_str().unwrap();
    let claims = app.state.tokens.authenticate(access).await.unwrap();
    assert!(claims.capabilities().allows("audit:read"));
}

#[tokio::test]
async fn test_login_reports_all_field_errors() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "nope", "password": "" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error_code(), "VALIDATION_FAILED");
    let details = &response.body["error"]["details"];
    assert!(details["email"].is_array());
    assert!(details["password"].is_array());
}
