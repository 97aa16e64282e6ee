//! Auth service configuration.

use chrono::Duration;

/// Settings for [`AuthService`](crate::AuthService).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Application name used in outgoing mail.
    pub app_name: String,
    /// How long a cached session lives without a refresh.
    pub session_ttl: Duration,
    /// Reject logins from accounts that never completed activation.
    pub require_verified: bool,
}

impl AuthConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    /// Sets the session TTL.
    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Sets whether logins require a verified account.
    pub fn require_verified(mut self, required: bool) -> Self {
        self.require_verified = required;
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            app_name: "Day Planner".to_string(),
            session_ttl: Duration::days(7),
            require_verified: true,
        }
    }
}
