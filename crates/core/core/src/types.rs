//! Core data types for the Day Planner API.
//!
//! This module defines the canonical `User`, its public `UserProfile`
//! projection, the cached `Session`, and the `PlannerEvent` records that the
//! reminder job reads from the headless CMS.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default role assigned to newly activated users.
pub const DEFAULT_ROLE: &str = "user";

/// Represents a registered user as persisted by a [`UserStore`].
///
/// The password hash never leaves the service layer; anything returned over
/// HTTP or written to the session cache goes through [`UserProfile`].
///
/// [`UserStore`]: crate::traits::UserStore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user (UUID v4)
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address, normalized to lower case
    pub email: String,

    /// Argon2 PHC string
    pub password_hash: String,

    /// Optional avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Role name
    pub role: String,

    /// Whether the account went through activation
    #[serde(default)]
    pub is_verified: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a verified user from an activated registration.
    pub fn from_registration(pending: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: pending.name,
            email: pending.email,
            password_hash: pending.password_hash,
            avatar: pending.avatar,
            role: DEFAULT_ROLE.to_string(),
            is_verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the public projection of this user.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }

    /// Bumps `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Public view of a user, safe to serialize to clients and to the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            role: user.role.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// A registration awaiting activation.
///
/// This travels inside the signed activation token, so the password is
/// already hashed by the time it is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Represents a cached login session for a user.
///
/// Sessions are keyed by user id in the [`SessionCache`]. At most one
/// refresh token (identified by `refresh_jti`) may rotate a session.
///
/// [`SessionCache`]: crate::traits::SessionCache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Snapshot of the user at login time (kept in sync on profile updates)
    pub user: UserProfile,

    /// JWT id of the refresh token currently allowed to rotate this session
    pub refresh_jti: String,

    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the session was last rotated or updated
    pub updated_at: DateTime<Utc>,

    /// When the session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session for the given user.
    pub fn new(user: UserProfile, refresh_jti: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user,
            refresh_jti: refresh_jti.into(),
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
        }
    }

    /// The id of the user owning this session.
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    /// Checks if the session has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Records a freshly issued refresh token and extends the expiration.
    pub fn rotate(&mut self, refresh_jti: impl Into<String>, ttl: Duration) {
        let now = Utc::now();
        self.refresh_jti = refresh_jti.into();
        self.updated_at = now;
        self.expires_at = now + ttl;
    }
}

/// A calendar event managed in the headless CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerEvent {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub reminder_at: DateTime<Utc>,
    #[serde(default)]
    pub reminder_sent: bool,
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl PlannerEvent {
    /// True when the reminder has not been sent and its time has come.
    pub fn is_reminder_due(&self, now: DateTime<Utc>) -> bool {
        !self.reminder_sent && self.reminder_at <= now
    }
}

/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_user_from_registration() {
        let user = User::from_registration(pending());
        assert!(user.is_verified);
        assert_eq!(user.role, DEFAULT_ROLE);
        assert_eq!(user.email, "ada@example.com");
        assert!(uuid::Uuid::parse_str(&user.id).is_ok());
    }

    #[test]
    fn test_profile_omits_password_hash() {
        let user = User::from_registration(pending());
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_session_expiration() {
        let user = User::from_registration(pending());
        let session = Session::new(user.profile(), "jti-1", Duration::seconds(-1));
        assert!(session.is_expired());
    }

    #[test]
    fn test_session_rotation() {
        let user = User::from_registration(pending());
        let mut session = Session::new(user.profile(), "jti-1", Duration::seconds(-1));
        session.rotate("jti-2", Duration::days(7));
        assert_eq!(session.refresh_jti, "jti-2");
        assert!(!session.is_expired());
        assert_eq!(session.user_id(), user.id);
    }

    #[test]
    fn test_reminder_due() {
        let now = Utc::now();
        let mut event = PlannerEvent {
            id: "1".to_string(),
            title: "Dentist".to_string(),
            description: None,
            location: None,
            starts_at: now + Duration::hours(1),
            reminder_at: now - Duration::minutes(1),
            reminder_sent: false,
            user_email: "ada@example.com".to_string(),
            user_name: None,
        };
        assert!(event.is_reminder_due(now));

        event.reminder_sent = true;
        assert!(!event.is_reminder_due(now));

        event.reminder_sent = false;
        event.reminder_at = now + Duration::minutes(5);
        assert!(!event.is_reminder_due(now));
    }
}
