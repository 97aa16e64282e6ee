//! Error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dayplanner_core::error::PlannerError;
use serde::de::DeserializeOwned;

/// An error rendered as `{"success": false, "error": <code>, "message": <text>}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// A 400 for request bodies that could not be parsed.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_body",
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Upstream and internal failures are logged in full and reported vaguely.
        let message = match status {
            StatusCode::BAD_GATEWAY => {
                tracing::error!(error = %err, "Upstream service failed");
                "An upstream service is unavailable, please try again later".to_string()
            }
            s if s.is_server_error() => {
                tracing::error!(error = %err, "Request failed");
                "Internal server error".to_string()
            }
            _ => err.to_string(),
        };

        Self {
            status,
            code: err.error_code(),
            message,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "error": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// `Json` whose rejections render as [`ApiError`] with status 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_keep_message() {
        let err = ApiError::from(PlannerError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "invalid_credentials");
        assert_eq!(err.message, "Invalid email or password");
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let err = ApiError::from(PlannerError::database("password=hunter2 connection refused"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("hunter2"));

        let err = ApiError::from(PlannerError::mail("postmark 422"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "mail_error");
    }
}
