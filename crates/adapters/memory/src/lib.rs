//! # Day Planner Memory Adapter
//!
//! In-memory implementations of every collaborator trait, intended for
//! testing and local development:
//!
//! - [`MemoryAdapter`]: `UserStore` + `SessionCache`
//! - [`MemoryContentSource`]: a seedable stand-in for the headless CMS
//! - [`MemoryMailer`]: an outbox that records messages and can simulate failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dayplanner_adapter_memory::MemoryAdapter;
//!
//! let adapter = Arc::new(MemoryAdapter::new());
//! let auth = AuthService::new(adapter.clone(), adapter.clone(), mailer, tokens, hasher, config);
//! ```

mod content;
mod mailer;

pub use content::MemoryContentSource;
pub use mailer::MemoryMailer;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dayplanner_core::error::{PlannerError, PlannerResult};
use dayplanner_core::traits::{SessionCache, UserStore};
use dayplanner_core::types::{Session, User};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage for a single entity type.
type Store<T> = Arc<RwLock<HashMap<String, T>>>;

/// A serialized session and its expiry, mirroring a `SET .. EX ..` cache entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: String,
    expires_at: DateTime<Utc>,
}

/// In-memory user store and session cache.
///
/// Data is lost when the process exits.
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    users: Store<User>,
    sessions: Store<CacheEntry>,
}

impl MemoryAdapter {
    /// Creates a new in-memory adapter.
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clears all stored data.
    pub async fn clear(&self) {
        self.users.write().await.clear();
        self.sessions.write().await.clear();
    }

    /// Returns the number of users stored.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns the number of live (unexpired) sessions.
    pub async fn session_count(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryAdapter {
    async fn create_user(&self, user: &User) -> PlannerResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(PlannerError::duplicate("user", "email", &user.email));
        }

        users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn get_user_by_id(&self, id: &str) -> PlannerResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> PlannerResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: &User) -> PlannerResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(PlannerError::not_found("user", "id", &user.id));
        }

        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(PlannerError::duplicate("user", "email", &user.email));
        }

        users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str) -> PlannerResult<()> {
        self.users.write().await.remove(id);
        self.sessions.write().await.remove(id);
        Ok(())
    }
}

#[async_trait]
impl SessionCache for MemoryAdapter {
    async fn put(&self, user_id: &str, session: &Session, ttl: Duration) -> PlannerResult<()> {
        let now = Utc::now();
        let entry = CacheEntry {
            payload: serde_json::to_string(session)?,
            expires_at: now + ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, cached| cached.expires_at > now);
        sessions.insert(user_id.to_string(), entry);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> PlannerResult<Option<Session>> {
        let entry = {
            let sessions = self.sessions.read().await;
            sessions.get(user_id).cloned()
        };

        match entry {
            Some(entry) if entry.expires_at > Utc::now() => {
                Ok(Some(serde_json::from_str(&entry.payload)?))
            }
            Some(_) => {
                tracing::debug!(user_id, "Evicting expired session");
                self.sessions.write().await.remove(user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, user_id: &str) -> PlannerResult<()> {
        self.sessions.write().await.remove(user_id);
        Ok(())
    }
}
