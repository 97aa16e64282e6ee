//! Authentication middleware layer for Axum.

use crate::cookies::{ACCESS_COOKIE, read_cookie};
use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, Response};
use dayplanner_auth::AuthService;
use dayplanner_core::error::PlannerError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Layer that resolves the access token to a cached session.
///
/// The token is taken from `Authorization: Bearer ..` or, failing that, the
/// `access_token` cookie. On success the [`Session`](dayplanner_core::Session)
/// is inserted into the request extensions; otherwise the request passes
/// through and [`AuthSession`](crate::AuthSession) rejects it. An expired
/// token leaves an [`ExpiredAccessToken`] marker so the rejection says so.
#[derive(Clone)]
pub struct AuthLayer {
    auth: Arc<AuthService>,
}

impl AuthLayer {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            auth: self.auth.clone(),
        }
    }
}

/// Middleware service produced by [`AuthLayer`].
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    auth: Arc<AuthService>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let auth = self.auth.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if let Some(token) = extract_access_token(&req) {
                match auth.authenticate(&token).await {
                    Ok(session) => {
                        req.extensions_mut().insert(session);
                    }
                    Err(PlannerError::TokenExpired) => {
                        tracing::debug!("Access token expired");
                        req.extensions_mut().insert(ExpiredAccessToken);
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "Access token rejected");
                    }
                }
            }

            inner.call(req).await
        })
    }
}

/// Request extension set when the presented access token had expired.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExpiredAccessToken;

/// Bearer header first, then the access cookie.
fn extract_access_token(req: &Request<Body>) -> Option<String> {
    extract_bearer_token(req).or_else(|| read_cookie(req.headers(), ACCESS_COOKIE))
}

/// Extracts bearer token from Authorization header.
fn extract_bearer_token(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}
