//! Collaborator traits for the Day Planner API.
//!
//! The services only talk to the outside world through these traits.
//! Adapters implement them for a concrete database, cache, CMS or mail
//! transport; the memory adapter implements all of them for tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::PlannerResult;
use crate::types::{EmailMessage, PlannerEvent, Session, User};

/// Trait for user persistence (database backends).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a new user.
    ///
    /// Fails with `DuplicateEntry` if the email is already taken.
    async fn create_user(&self, user: &User) -> PlannerResult<User>;

    /// Gets a user by ID.
    async fn get_user_by_id(&self, id: &str) -> PlannerResult<Option<User>>;

    /// Gets a user by (normalized) email.
    async fn get_user_by_email(&self, email: &str) -> PlannerResult<Option<User>>;

    /// Updates an existing user.
    ///
    /// Fails with `NotFound` if no user has this id.
    async fn update_user(&self, user: &User) -> PlannerResult<User>;

    /// Deletes a user by ID.
    async fn delete_user(&self, id: &str) -> PlannerResult<()>;

    /// Checks whether an email is already registered.
    async fn email_exists(&self, email: &str) -> PlannerResult<bool> {
        Ok(self.get_user_by_email(email).await?.is_some())
    }
}

/// Trait for the session cache.
///
/// Sessions are stored serialized and keyed by user id. Entries past their
/// TTL must behave as absent.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Stores (or replaces) the session for a user.
    async fn put(&self, user_id: &str, session: &Session, ttl: Duration) -> PlannerResult<()>;

    /// Loads the session for a user.
    async fn get(&self, user_id: &str) -> PlannerResult<Option<Session>>;

    /// Removes the session for a user. Removing a missing session is not an error.
    async fn remove(&self, user_id: &str) -> PlannerResult<()>;
}

/// Trait for the headless CMS holding planner events.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Returns events whose reminder is due at `now` and not yet sent.
    async fn due_reminders(&self, now: DateTime<Utc>) -> PlannerResult<Vec<PlannerEvent>>;

    /// Flags the reminder of an event as sent.
    async fn mark_reminder_sent(&self, event_id: &str) -> PlannerResult<()>;
}

/// Trait for the outgoing mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a message.
    async fn send(&self, message: &EmailMessage) -> PlannerResult<()>;
}
