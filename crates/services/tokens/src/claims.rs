//! JWT claims structures.

use chrono::{DateTime, Duration, Utc};
use dayplanner_core::types::NewUser;
use serde::{Deserialize, Serialize};

/// Discriminates the three token kinds so one can never stand in for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    Activation,
}

/// Claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID).
    pub sub: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// JWT ID (unique identifier for this token).
    pub jti: String,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Token kind, always `access`.
    pub kind: TokenKind,
}

impl AccessTokenClaims {
    /// Creates new access token claims for a user.
    pub fn new(user_id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            iss: None,
            kind: TokenKind::Access,
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Checks if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Gets the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Claims for refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject (user ID).
    pub sub: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// JWT ID, matched against the session's current refresh jti on rotation.
    pub jti: String,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Token kind, always `refresh`.
    pub kind: TokenKind,
}

impl RefreshTokenClaims {
    /// Creates new refresh token claims for a user.
    pub fn new(user_id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            iss: None,
            kind: TokenKind::Refresh,
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Checks if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Claims for activation tokens.
///
/// The pending registration rides inside the token, so nothing is persisted
/// until the user proves ownership of the email address. The token is
/// returned to the registering client, so the code is only present as a
/// keyed digest. The password hash is the argon2 hash of a password that
/// client just submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationClaims {
    /// The registration awaiting activation.
    pub user: NewUser,

    /// Token id, bound into `code_digest`.
    pub jti: String,

    /// HMAC of the mailed code; see [`CodeDigest`](crate::CodeDigest).
    pub code_digest: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Token kind, always `activation`.
    pub kind: TokenKind,
}

impl ActivationClaims {
    /// Creates new activation claims. The code digest is set separately.
    pub fn new(user: NewUser, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user,
            jti: uuid::Uuid::new_v4().to_string(),
            code_digest: String::new(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: None,
            kind: TokenKind::Activation,
        }
    }

    /// Sets the code digest.
    pub fn with_code_digest(mut self, digest: impl Into<String>) -> Self {
        self.code_digest = digest.into();
        self
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }
}
