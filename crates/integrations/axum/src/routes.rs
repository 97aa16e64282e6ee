//! REST endpoints under `/api/v1`.

use crate::cookies::{ACCESS_COOKIE, CookieConfig, REFRESH_COOKIE, read_cookie};
use crate::error::{ApiError, ApiJson};
use crate::extractor::AuthSession;
use crate::layer::AuthLayer;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use dayplanner_auth::{AuthOutcome, AuthService, LoginRequest, RegistrationRequest, UpdateProfile};
use dayplanner_core::error::PlannerError;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Header carrying the refresh token for clients without cookies.
pub const REFRESH_HEADER: &str = "x-refresh-token";

/// Shared state for the API routes.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub cookies: CookieConfig,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, cookies: CookieConfig) -> Self {
        Self { auth, cookies }
    }

    /// `Set-Cookie` values for a freshly issued pair.
    fn token_cookies(&self, outcome: &AuthOutcome) -> [(axum::http::HeaderName, String); 2] {
        let tokens = &outcome.tokens;
        [
            (
                SET_COOKIE,
                self.cookies
                    .set(ACCESS_COOKIE, &tokens.access_token, tokens.expires_in),
            ),
            (
                SET_COOKIE,
                self.cookies
                    .set(REFRESH_COOKIE, &tokens.refresh_token, tokens.refresh_expires_in),
            ),
        ]
    }
}

/// Builds the full application router.
///
/// ```rust,ignore
/// let app = dayplanner_axum::router(AppState::new(auth, CookieConfig::default()));
/// axum::serve(listener, app).await?;
/// ```
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/registration", post(registration))
        .route("/activate-user", post(activate_user))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/refresh", get(refresh))
        .route("/me", get(me))
        .route("/update-user-info", put(update_user_info))
        .route("/update-user-password", put(update_user_password))
        .layer(AuthLayer::new(state.auth.clone()));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .fallback(not_found)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ActivationRequest {
    #[serde(default)]
    activation_token: String,
    #[serde(default)]
    activation_code: String,
}

#[derive(Debug, Deserialize)]
struct PasswordChange {
    #[serde(default)]
    old_password: String,
    #[serde(default)]
    new_password: String,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found(uri: Uri) -> ApiError {
    PlannerError::not_found("route", "path", uri.path()).into()
}

async fn registration(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegistrationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": format!("Please check your email: {} to activate your account!", outcome.email),
            "activation_token": outcome.activation_token,
        })),
    ))
}

async fn activate_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ActivationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth
        .activate(&request.activation_token, &request.activation_code)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": user })),
    ))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.login(request).await?;
    Ok((
        AppendHeaders(state.token_cookies(&outcome)),
        Json(json!({
            "success": true,
            "user": outcome.user,
            "access_token": outcome.tokens.access_token,
        })),
    ))
}

async fn logout(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.logout(session.user_id()).await?;
    Ok((
        AppendHeaders([
            (SET_COOKIE, state.cookies.clear(ACCESS_COOKIE)),
            (SET_COOKIE, state.cookies.clear(REFRESH_COOKIE)),
        ]),
        Json(json!({ "success": true, "message": "Logged out successfully" })),
    ))
}

async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = read_cookie(&headers, REFRESH_COOKIE)
        .or_else(|| {
            headers
                .get(REFRESH_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .ok_or(PlannerError::SessionNotFound)?;

    let outcome = state.auth.refresh(&token).await?;
    Ok((
        AppendHeaders(state.token_cookies(&outcome)),
        Json(json!({
            "success": true,
            "access_token": outcome.tokens.access_token,
        })),
    ))
}

async fn me(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.current_user(session.user_id()).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

async fn update_user_info(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(update): ApiJson<UpdateProfile>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.update_profile(session.user_id(), update).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

async fn update_user_password(
    State(state): State<AppState>,
    session: AuthSession,
    ApiJson(change): ApiJson<PasswordChange>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth
        .update_password(session.user_id(), &change.old_password, &change.new_password)
        .await?;
    Ok(Json(json!({ "success": true })))
}
