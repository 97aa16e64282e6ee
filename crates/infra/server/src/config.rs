//! Server configuration.
//!
//! Loaded from TOML, then overridden by `DAYPLANNER_<SECTION>_<KEY>`
//! environment variables, then validated.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "DAYPLANNER_CONFIG";
/// Config file used when neither a CLI argument nor `DAYPLANNER_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "dayplanner.toml";
/// Value selecting the in-process adapters.
pub const MEMORY: &str = "memory";

const ENV_PREFIX: &str = "DAYPLANNER_";
const PLACEHOLDER_PREFIX: &str = "change-me";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// `[server]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// `[auth]`
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub app_name: String,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub activation_secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub activation_token_ttl_secs: u64,
    pub session_ttl_secs: u64,
    /// Adds `Secure` to token cookies.
    pub cookie_secure: bool,
    pub require_verified: bool,
    /// Optional `iss` claim.
    pub issuer: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            app_name: "Day Planner".to_string(),
            access_token_secret: "change-me-access".to_string(),
            refresh_token_secret: "change-me-refresh".to_string(),
            activation_secret: "change-me-activation".to_string(),
            access_token_ttl_secs: 5 * 60,
            refresh_token_ttl_secs: 3 * 24 * 60 * 60,
            activation_token_ttl_secs: 5 * 60,
            session_ttl_secs: 7 * 24 * 60 * 60,
            cookie_secure: false,
            require_verified: true,
            issuer: None,
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("app_name", &self.app_name)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("activation_token_ttl_secs", &self.activation_token_ttl_secs)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("cookie_secure", &self.cookie_secure)
            .field("require_verified", &self.require_verified)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// `[storage]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Postgres URL, or `memory`.
    pub database_url: String,
    /// Redis URL, or `memory`.
    pub redis_url: String,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: MEMORY.to_string(),
            redis_url: MEMORY.to_string(),
            max_connections: 5,
        }
    }
}

/// `[cms]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsSettings {
    /// CMS base URL, or `memory`.
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_ms: u64,
}

impl Default for CmsSettings {
    fn default() -> Self {
        Self {
            base_url: MEMORY.to_string(),
            api_token: None,
            timeout_ms: 10_000,
        }
    }
}

/// `[mail]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Mail API base URL, or `memory`.
    pub base_url: String,
    pub api_token: Option<String>,
    /// `From` address.
    pub sender: String,
    pub timeout_ms: u64,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            base_url: MEMORY.to_string(),
            api_token: None,
            sender: "noreply@dayplanner.app".to_string(),
            timeout_ms: 5_000,
        }
    }
}

/// `[reminders]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthSettings,
    pub storage: StorageConfig,
    pub cms: CmsSettings,
    pub mail: MailSettings,
    pub reminders: ReminderSettings,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    IoError { path: String, message: String },
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Returns true when `url` selects the in-process adapter.
pub fn is_memory(url: &str) -> bool {
    url.trim().eq_ignore_ascii_case(MEMORY)
}

/// Picks the config path: CLI argument, then `DAYPLANNER_CONFIG`, then the default.
///
/// The flag tells whether the path was chosen explicitly.
pub fn resolve_path(cli_arg: Option<String>, env_value: Option<String>) -> (PathBuf, bool) {
    match cli_arg.or(env_value).filter(|p| !p.trim().is_empty()) {
        Some(path) => (PathBuf::from(path), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    }
}

impl AppConfig {
    /// Parses a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Reads `path`. A missing file is an error only when `required` is set.
    pub fn from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(e) => Err(ConfigError::IoError {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Applies `DAYPLANNER_<SECTION>_<KEY>` overrides from the process environment.
    ///
    /// Returns the overrides that failed to parse; they are left unapplied.
    pub fn apply_env(&mut self) -> Vec<String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut o = Overrides {
            lookup,
            rejected: Vec::new(),
        };

        o.apply("SERVER_HOST", &mut self.server.host);
        o.apply("SERVER_PORT", &mut self.server.port);
        o.apply("SERVER_LOG_LEVEL", &mut self.server.log_level);
        o.apply("SERVER_LOG_FORMAT", &mut self.server.log_format);

        o.apply("AUTH_APP_NAME", &mut self.auth.app_name);
        o.apply("AUTH_ACCESS_TOKEN_SECRET", &mut self.auth.access_token_secret);
        o.apply("AUTH_REFRESH_TOKEN_SECRET", &mut self.auth.refresh_token_secret);
        o.apply("AUTH_ACTIVATION_SECRET", &mut self.auth.activation_secret);
        o.apply("AUTH_ACCESS_TOKEN_TTL_SECS", &mut self.auth.access_token_ttl_secs);
        o.apply("AUTH_REFRESH_TOKEN_TTL_SECS", &mut self.auth.refresh_token_ttl_secs);
        o.apply("AUTH_ACTIVATION_TOKEN_TTL_SECS", &mut self.auth.activation_token_ttl_secs);
        o.apply("AUTH_SESSION_TTL_SECS", &mut self.auth.session_ttl_secs);
        o.apply("AUTH_COOKIE_SECURE", &mut self.auth.cookie_secure);
        o.apply("AUTH_REQUIRE_VERIFIED", &mut self.auth.require_verified);
        o.apply_optional("AUTH_ISSUER", &mut self.auth.issuer);

        o.apply("STORAGE_DATABASE_URL", &mut self.storage.database_url);
        o.apply("STORAGE_REDIS_URL", &mut self.storage.redis_url);
        o.apply("STORAGE_MAX_CONNECTIONS", &mut self.storage.max_connections);

        o.apply("CMS_BASE_URL", &mut self.cms.base_url);
        o.apply_optional("CMS_API_TOKEN", &mut self.cms.api_token);
        o.apply("CMS_TIMEOUT_MS", &mut self.cms.timeout_ms);

        o.apply("MAIL_BASE_URL", &mut self.mail.base_url);
        o.apply_optional("MAIL_API_TOKEN", &mut self.mail.api_token);
        o.apply("MAIL_SENDER", &mut self.mail.sender);
        o.apply("MAIL_TIMEOUT_MS", &mut self.mail.timeout_ms);

        o.apply("REMINDERS_ENABLED", &mut self.reminders.enabled);
        o.apply("REMINDERS_INTERVAL_SECS", &mut self.reminders.interval_secs);

        o.rejected
    }

    /// True when every backend runs in-process, so no token can reach real data.
    pub fn is_memory_mode(&self) -> bool {
        [
            &self.storage.database_url,
            &self.storage.redis_url,
            &self.cms.base_url,
            &self.mail.base_url,
        ]
        .into_iter()
        .all(|url| is_memory(url))
    }

    /// Checks the settings for values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secrets = [
            ("auth.access_token_secret", &self.auth.access_token_secret),
            ("auth.refresh_token_secret", &self.auth.refresh_token_secret),
            ("auth.activation_secret", &self.auth.activation_secret),
        ];
        for (key, value) in secrets {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
            if !self.is_memory_mode() && value.starts_with(PLACEHOLDER_PREFIX) {
                return Err(ConfigError::Invalid(format!(
                    "{key} still holds the placeholder value"
                )));
            }
        }

        let ttls = [
            ("auth.access_token_ttl_secs", self.auth.access_token_ttl_secs),
            ("auth.refresh_token_ttl_secs", self.auth.refresh_token_ttl_secs),
            ("auth.activation_token_ttl_secs", self.auth.activation_token_ttl_secs),
            ("auth.session_ttl_secs", self.auth.session_ttl_secs),
            ("reminders.interval_secs", self.reminders.interval_secs),
        ];
        for (key, value) in ttls {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{key} must be greater than zero")));
            }
        }

        if !is_memory(&self.mail.base_url)
            && self.mail.api_token.as_deref().is_none_or(|t| t.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "mail.api_token is required with a remote mail API".to_string(),
            ));
        }

        Ok(())
    }
}

struct Overrides<F> {
    lookup: F,
    rejected: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> Overrides<F> {
    fn apply<T>(&mut self, key: &str, slot: &mut T)
    where
        T: FromStr,
        T::Err: Display,
    {
        let name = format!("{ENV_PREFIX}{key}");
        let Some(raw) = (self.lookup)(&name) else {
            return;
        };
        match raw.trim().parse() {
            Ok(value) => *slot = value,
            Err(e) => self.rejected.push(format!("{name}: {e}")),
        }
    }

    fn apply_optional(&mut self, key: &str, slot: &mut Option<String>) {
        let name = format!("{ENV_PREFIX}{key}");
        if let Some(raw) = (self.lookup)(&name) {
            let raw = raw.trim();
            *slot = (!raw.is_empty()).then(|| raw.to_string());
        }
    }
}
