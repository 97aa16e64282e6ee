//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use dayplanner_adapter_memory::{MemoryAdapter, MemoryMailer};
use dayplanner_auth::{AuthConfig, AuthService};
use dayplanner_axum::{AppState, CookieConfig, router};
use dayplanner_password::PasswordHasher;
use dayplanner_tokens::{TokenConfig, TokenService};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    mailer: Arc<MemoryMailer>,
}

fn test_app() -> TestApp {
    test_app_with(TokenConfig::new("access", "refresh", "activation"))
}

fn test_app_with(tokens: TokenConfig) -> TestApp {
    let adapter = Arc::new(MemoryAdapter::new());
    let mailer = Arc::new(MemoryMailer::new());
    let auth = AuthService::new(
        adapter.clone(),
        adapter,
        mailer.clone(),
        TokenService::new(tokens),
        PasswordHasher::default(),
        AuthConfig::new("Day Planner"),
    );
    let app = router(AppState::new(Arc::new(auth), CookieConfig::default()));
    TestApp { app, mailer }
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// `name=value` pair of the cookie called `name`.
fn cookie_pair(cookies: &[String], name: &str) -> String {
    cookies
        .iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .and_then(|c| c.split(';').next())
        .unwrap()
        .to_string()
}

/// Registers, activates and logs in; returns the login response.
async fn signed_in(t: &TestApp) -> Response<Body> {
    let response = send(
        &t.app,
        json_request(
            "POST",
            "/api/v1/registration",
            json!({ "name": "Ada", "email": "ada@example.com", "password": "analytical1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let token = body_json(response).await["activation_token"]
        .as_str()
        .unwrap()
        .to_string();

    let mail = t.mailer.last_to("ada@example.com").await.unwrap();
    let marker = "Your activation code is: ";
    let start = mail.text_body.find(marker).unwrap() + marker.len();
    let code = &mail.text_body[start..start + 4];

    let response = send(
        &t.app,
        json_request(
            "POST",
            "/api/v1/activate-user",
            json!({ "activation_token": token, "activation_code": code }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &t.app,
        json_request(
            "POST",
            "/api/v1/login",
            json!({ "email": "ada@example.com", "password": "analytical1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    response
}

#[tokio::test]
async fn health_is_public() {
    let t = test_app();
    let response = send(&t.app, get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let t = test_app();
    let response = send(&t.app, get("/api/v1/nope").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn login_sets_cookies_and_returns_user() {
    let t = test_app();
    let response = signed_in(&t).await;

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("access_token=") && c.contains("Max-Age=300")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=") && c.contains("Max-Age=259200")));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn me_requires_authentication() {
    let t = test_app();
    let response = send(&t.app, get("/api/v1/me").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "session_not_found");
    assert_eq!(body["message"], "Please login to access this resource");
}

#[tokio::test]
async fn expired_access_token_is_reported() {
    let t = test_app_with(
        TokenConfig::new("access", "refresh", "activation")
            .access_token_ttl(chrono::Duration::seconds(-5)),
    );
    let access = body_json(signed_in(&t).await).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(
        &t.app,
        get("/api/v1/me")
            .header(AUTHORIZATION, format!("Bearer {access}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "token_expired");

    let response = send(
        &t.app,
        get("/api/v1/me")
            .header(AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "session_not_found");
}

#[tokio::test]
async fn me_accepts_bearer_and_cookie() {
    let t = test_app();
    let login = signed_in(&t).await;
    let cookies = set_cookies(&login);
    let access = body_json(login).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let by_header = send(
        &t.app,
        get("/api/v1/me")
            .header(AUTHORIZATION, format!("Bearer {access}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(by_header.status(), StatusCode::OK);
    assert_eq!(body_json(by_header).await["user"]["name"], "Ada");

    let by_cookie = send(
        &t.app,
        get("/api/v1/me")
            .header(COOKIE, cookie_pair(&cookies, "access_token"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(by_cookie.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_rotates_and_rejects_replay() {
    let t = test_app();
    let login = signed_in(&t).await;
    let refresh_cookie = cookie_pair(&set_cookies(&login), "refresh_token");

    let first = send(
        &t.app,
        get("/api/v1/refresh")
            .header(COOKIE, &refresh_cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let rotated = cookie_pair(&set_cookies(&first), "refresh_token");
    assert_ne!(rotated, refresh_cookie);

    // Header transport works for the rotated token.
    let token = rotated.trim_start_matches("refresh_token=").to_string();
    let second = send(
        &t.app,
        get("/api/v1/refresh")
            .header("x-refresh-token", token)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(second.status(), StatusCode::OK);

    let replay = send(
        &t.app,
        get("/api/v1/refresh")
            .header(COOKIE, &refresh_cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(replay).await["error"], "token_reused");
}

#[tokio::test]
async fn refresh_without_token_is_unauthorized() {
    let t = test_app();
    let response = send(&t.app, get("/api/v1/refresh").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_cookies_and_session() {
    let t = test_app();
    let login = signed_in(&t).await;
    let access_cookie = cookie_pair(&set_cookies(&login), "access_token");

    let response = send(
        &t.app,
        get("/api/v1/logout")
            .header(COOKIE, &access_cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = set_cookies(&response);
    assert_eq!(cleared.len(), 2);
    assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));

    let after = send(
        &t.app,
        get("/api/v1/me")
            .header(COOKIE, &access_cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_info_and_password() {
    let t = test_app();
    let login = signed_in(&t).await;
    let access_cookie = cookie_pair(&set_cookies(&login), "access_token");

    let mut request = json_request("PUT", "/api/v1/update-user-info", json!({ "name": "Countess" }));
    request
        .headers_mut()
        .insert(COOKIE, access_cookie.parse().unwrap());
    let response = send(&t.app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["name"], "Countess");

    let mut request = json_request(
        "PUT",
        "/api/v1/update-user-password",
        json!({ "old_password": "wrong-one", "new_password": "difference2" }),
    );
    request
        .headers_mut()
        .insert(COOKIE, access_cookie.parse().unwrap());
    let response = send(&t.app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = json_request(
        "PUT",
        "/api/v1/update-user-password",
        json!({ "old_password": "analytical1", "new_password": "difference2" }),
    );
    request
        .headers_mut()
        .insert(COOKIE, access_cookie.parse().unwrap());
    let response = send(&t.app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let t = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let response = send(&t.app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn registration_validation_errors() {
    let t = test_app();

    let missing = send(
        &t.app,
        json_request("POST", "/api/v1/registration", json!({ "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], "missing_field");

    signed_in(&t).await;
    let duplicate = send(
        &t.app,
        json_request(
            "POST",
            "/api/v1/registration",
            json!({ "name": "Ada", "email": "ada@example.com", "password": "analytical1" }),
        ),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let t = test_app();
    let response = send(
        &t.app,
        json_request(
            "POST",
            "/api/v1/login",
            json!({ "email": "ghost@example.com", "password": "whatever1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_credentials");
}
