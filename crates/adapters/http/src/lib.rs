//! # Day Planner HTTP Adapters
//!
//! `reqwest` clients for the two remote collaborators:
//!
//! - [`CmsClient`]: a Strapi-style REST API holding planner events
//! - [`HttpMailer`]: a Postmark-style transactional mail API

mod cms;
mod mailer;

pub use cms::{CmsClient, CmsConfig};
pub use mailer::{HttpMailer, HttpMailerConfig};

use dayplanner_core::error::PlannerError;

/// Renders a transport error, calling out timeouts.
fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    }
}

/// Builds a client with the given per-request timeout.
fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client, PlannerError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PlannerError::config(format!("failed to build HTTP client: {e}")))
}

/// Joins a base URL and a path without doubling slashes.
fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
