//! # Day Planner Axum Integration
//!
//! HTTP surface of the Day Planner API:
//! - [`router`]: every REST endpoint, mounted under `/api/v1`
//! - [`AuthLayer`]: resolves access tokens (bearer header or cookie) to sessions
//! - [`AuthSession`]: extractor that rejects unauthenticated requests with 401
//! - [`ApiError`]: maps `PlannerError` to JSON error bodies
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dayplanner_axum::{router, AppState, CookieConfig};
//!
//! let app = router(AppState::new(Arc::new(auth), CookieConfig { secure: true }));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! ```

mod cookies;
mod error;
mod extractor;
mod layer;
mod routes;

pub use cookies::{ACCESS_COOKIE, CookieConfig, REFRESH_COOKIE, read_cookie};
pub use error::{ApiError, ApiJson};
pub use extractor::AuthSession;
pub use layer::{AuthLayer, AuthMiddleware};
pub use routes::{AppState, REFRESH_HEADER, router};
