//! Session extractors for Axum handlers.

use crate::error::ApiError;
use crate::layer::ExpiredAccessToken;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dayplanner_core::error::PlannerError;
use dayplanner_core::types::{Session, UserProfile};

/// Extractor for authenticated sessions.
///
/// Rejects with 401 unless [`AuthLayer`](crate::AuthLayer) resolved a session:
/// `token_expired` for an expired access token, `session_not_found` otherwise.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(session: AuthSession) -> String {
///     format!("Hello, {}!", session.user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user, as cached on the session.
    pub user: UserProfile,
    /// The current session.
    pub session: Session,
}

impl AuthSession {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            if parts.extensions.get::<ExpiredAccessToken>().is_some() {
                return Err(PlannerError::TokenExpired.into());
            }
            return Err(PlannerError::SessionNotFound.into());
        };

        Ok(AuthSession {
            user: session.user.clone(),
            session,
        })
    }
}
