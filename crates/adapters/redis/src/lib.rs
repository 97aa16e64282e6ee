//! # Day Planner Redis Adapter
//!
//! Session cache backed by Redis. Each session is a JSON string under
//! `session:<user_id>`, written with `SET .. EX <ttl>` so Redis expires it
//! on its own.

use async_trait::async_trait;
use chrono::Duration;
use dayplanner_core::error::{PlannerError, PlannerResult};
use dayplanner_core::traits::SessionCache;
use dayplanner_core::types::Session;
use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};

const KEY_PREFIX: &str = "session:";

/// Builds the cache key for a user's session.
pub fn session_key(user_id: &str) -> String {
    format!("{KEY_PREFIX}{user_id}")
}

/// Converts a TTL to whole seconds, never below one.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.num_seconds().max(1) as u64
}

/// Connection manager settings: one retry, 100 ms connect timeout.
fn connection_config() -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(std::time::Duration::from_millis(100))
}

fn cache_error(err: redis::RedisError) -> PlannerError {
    PlannerError::cache(err.to_string())
}

/// [`SessionCache`] over a Redis connection manager.
#[derive(Clone)]
pub struct RedisSessionCache {
    conn: ConnectionManager,
}

impl RedisSessionCache {
    /// Connects to `redis_url` with one retry and a 100 ms connect timeout.
    pub async fn connect(redis_url: &str) -> PlannerResult<Self> {
        let client = redis::Client::open(redis_url).map_err(cache_error)?;
        let conn = client
            .get_connection_manager_with_config(connection_config())
            .await
            .map_err(cache_error)?;

        tracing::info!("Connected to Redis session cache");
        Ok(Self { conn })
    }

    /// Wraps an existing connection manager.
    pub fn from_manager(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn put(&self, user_id: &str, session: &Session, ttl: Duration) -> PlannerResult<()> {
        let payload = serde_json::to_string(session)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(session_key(user_id), payload, ttl_seconds(ttl))
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn get(&self, user_id: &str) -> PlannerResult<Option<Session>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(session_key(user_id))
            .await
            .map_err(cache_error)?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, user_id: &str) -> PlannerResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(session_key(user_id))
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}
