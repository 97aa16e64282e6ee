//! # Day Planner Server
//!
//! Wires configuration to adapters and services, serves the HTTP API and
//! drives the reminder job until a shutdown signal arrives.
//!
//! Each backing service can be replaced by its in-process counterpart by
//! setting its URL to `memory`.

pub mod config;
pub mod shutdown;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, LogFormat};

use axum::Router;
use dayplanner_adapter_http::{CmsClient, CmsConfig, HttpMailer, HttpMailerConfig};
use dayplanner_adapter_memory::{MemoryAdapter, MemoryContentSource, MemoryMailer};
use dayplanner_adapter_postgres::PostgresUserStore;
use dayplanner_adapter_redis::RedisSessionCache;
use dayplanner_auth::{AuthConfig, AuthService};
use dayplanner_axum::{AppState, CookieConfig, router};
use dayplanner_core::error::PlannerError;
use dayplanner_core::traits::{ContentSource, Mailer, SessionCache, UserStore};
use dayplanner_password::PasswordHasher;
use dayplanner_reminders::{ReminderConfig, ReminderDispatcher, ReminderScheduler};
use dayplanner_tokens::{TokenConfig, TokenService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::config::is_memory;

/// Errors that stop the server from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Startup failed: {0}")]
    Startup(#[from] PlannerError),
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fully wired services.
pub struct Services {
    pub auth: Arc<AuthService>,
    pub reminders: Arc<ReminderDispatcher>,
    pub cookies: CookieConfig,
}

impl Services {
    /// The HTTP application.
    pub fn router(&self) -> Router {
        router(AppState::new(self.auth.clone(), self.cookies))
    }
}

/// Connects the configured backends and builds the services.
pub async fn build_services(config: &AppConfig) -> Result<Services, ServerError> {
    let (users, sessions) = stores(config).await?;
    let mailer = mailer(config)?;
    let content = content_source(config)?;

    let auth = &config.auth;
    let mut tokens = TokenConfig::new(
        auth.access_token_secret.as_str(),
        auth.refresh_token_secret.as_str(),
        auth.activation_secret.as_str(),
    )
    .access_token_ttl(seconds(auth.access_token_ttl_secs))
    .refresh_token_ttl(seconds(auth.refresh_token_ttl_secs))
    .activation_token_ttl(seconds(auth.activation_token_ttl_secs));
    if let Some(issuer) = &auth.issuer {
        tokens = tokens.issuer(issuer.as_str());
    }

    let auth_service = AuthService::new(
        users,
        sessions,
        mailer.clone(),
        TokenService::new(tokens),
        PasswordHasher::default(),
        AuthConfig::new(auth.app_name.as_str())
            .session_ttl(seconds(auth.session_ttl_secs))
            .require_verified(auth.require_verified),
    );

    let reminders = ReminderDispatcher::new(
        content,
        mailer,
        ReminderConfig::new(auth.app_name.as_str())
            .interval(Duration::from_secs(config.reminders.interval_secs))
            .enabled(config.reminders.enabled),
    );

    Ok(Services {
        auth: Arc::new(auth_service),
        reminders: Arc::new(reminders),
        cookies: CookieConfig {
            secure: auth.cookie_secure,
        },
    })
}

/// Serves until a shutdown signal, then stops the reminder job.
pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    config.validate()?;
    let services = build_services(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reminder_job = ReminderScheduler::spawn(services.reminders.clone(), shutdown_rx);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Day Planner API listening");

    let served = axum::serve(listener, services.router())
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = reminder_job.await {
        tracing::error!(error = %e, "Reminder job ended abnormally");
    }

    served?;
    tracing::info!("Server stopped");
    Ok(())
}

type Stores = (Arc<dyn UserStore>, Arc<dyn SessionCache>);

async fn stores(config: &AppConfig) -> Result<Stores, ServerError> {
    let storage = &config.storage;
    let memory = Arc::new(MemoryAdapter::new());

    let users: Arc<dyn UserStore> = if is_memory(&storage.database_url) {
        tracing::warn!("Using in-memory user store; users are lost on restart");
        memory.clone()
    } else {
        let store =
            PostgresUserStore::connect(&storage.database_url, storage.max_connections).await?;
        store.migrate().await?;
        tracing::info!("Connected to Postgres");
        Arc::new(store)
    };

    let sessions: Arc<dyn SessionCache> = if is_memory(&storage.redis_url) {
        tracing::warn!("Using in-memory session cache");
        memory
    } else {
        let cache = RedisSessionCache::connect(&storage.redis_url).await?;
        tracing::info!("Connected to Redis");
        Arc::new(cache)
    };

    Ok((users, sessions))
}

fn mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>, ServerError> {
    let mail = &config.mail;
    if is_memory(&mail.base_url) {
        tracing::warn!("Using in-memory mailer; messages are not delivered");
        return Ok(Arc::new(MemoryMailer::new()));
    }

    let api_token = mail
        .api_token
        .clone()
        .ok_or_else(|| ConfigError::Invalid("mail.api_token is required".to_string()))?;
    let mailer = HttpMailer::new(HttpMailerConfig {
        base_url: mail.base_url.clone(),
        api_token,
        sender: mail.sender.clone(),
        timeout: Duration::from_millis(mail.timeout_ms),
    })?;
    Ok(Arc::new(mailer))
}

fn content_source(config: &AppConfig) -> Result<Arc<dyn ContentSource>, ServerError> {
    let cms = &config.cms;
    if is_memory(&cms.base_url) {
        tracing::warn!("Using in-memory CMS; no reminders will be found");
        return Ok(Arc::new(MemoryContentSource::new()));
    }

    let mut settings =
        CmsConfig::new(cms.base_url.as_str()).timeout(Duration::from_millis(cms.timeout_ms));
    if let Some(token) = &cms.api_token {
        settings = settings.api_token(token.as_str());
    }
    Ok(Arc::new(CmsClient::new(settings)?))
}

/// Longest TTL accepted; larger values are clamped.
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

fn seconds(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_memory_mode_serves_health() {
        let services = build_services(&AppConfig::default()).await.unwrap();
        assert!(services.reminders.config().enabled);
        assert!(!services.cookies.secure);

        let response = services
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_settings_reach_services() {
        let mut config = AppConfig::default();
        config.auth.access_token_ttl_secs = 60;
        config.auth.cookie_secure = true;
        config.reminders.enabled = false;

        let services = build_services(&config).await.unwrap();
        assert_eq!(
            services.auth.tokens().config().access_token_ttl,
            chrono::Duration::seconds(60)
        );
        assert!(services.cookies.secure);
        assert!(!services.reminders.config().enabled);
    }

    #[tokio::test]
    async fn test_remote_mail_without_token_fails() {
        let mut config = AppConfig::default();
        config.mail.base_url = "https://api.postmarkapp.com".to_string();
        assert!(matches!(
            build_services(&config).await,
            Err(ServerError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_seconds_clamps() {
        assert_eq!(seconds(90), chrono::Duration::seconds(90));
        assert_eq!(seconds(u64::MAX), chrono::Duration::seconds(MAX_TTL_SECS as i64));
    }
}
