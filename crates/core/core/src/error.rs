//! Error types for the Day Planner API.
//!
//! This module defines the `PlannerError` enum which represents every failure
//! the services and adapters can report. The HTTP layer maps it to a status
//! code and a stable error code.

use thiserror::Error;

/// The main error type for Day Planner operations.
#[derive(Debug, Error)]
pub enum PlannerError {
    // ==================== Authentication Errors ====================
    /// The provided credentials are invalid.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The user was not found.
    #[error("User not found")]
    UserNotFound,

    /// No cached session exists for the token subject.
    #[error("Please login to access this resource")]
    SessionNotFound,

    /// The account has not been activated yet.
    #[error("Account is not verified")]
    AccountNotVerified,

    // ==================== Validation Errors ====================
    /// A required field is missing.
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A field value is invalid.
    #[error("Invalid field value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// The email format is invalid.
    #[error("Invalid email format")]
    InvalidEmail,

    /// The password does not meet requirements.
    #[error("Password does not meet requirements: {reason}")]
    WeakPassword { reason: String },

    /// The activation code does not match the activation token.
    #[error("Invalid activation code")]
    InvalidActivationCode,

    // ==================== Storage Errors ====================
    /// A database operation failed.
    #[error("Database error: {message}")]
    DatabaseError { message: String },

    /// A session cache operation failed.
    #[error("Cache error: {message}")]
    CacheError { message: String },

    /// The requested record was not found.
    #[error("Record not found: {entity} with {key}={value}")]
    NotFound {
        entity: String,
        key: String,
        value: String,
    },

    /// A unique constraint was violated (e.g., duplicate email).
    #[error("Duplicate entry: {entity} with {field}={value} already exists")]
    DuplicateEntry {
        entity: String,
        field: String,
        value: String,
    },

    // ==================== Token Errors ====================
    /// The token is invalid or malformed.
    #[error("Invalid token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Token generation failed.
    #[error("Failed to generate token: {reason}")]
    TokenGenerationFailed { reason: String },

    /// A refresh token that was already rotated out was presented again.
    #[error("Refresh token has already been used")]
    TokenReused,

    // ==================== Collaborator Errors ====================
    /// The headless CMS rejected or failed a request.
    #[error("CMS error: {message}")]
    CmsError { message: String },

    /// The mail transport rejected or failed a message.
    #[error("Mail delivery failed: {message}")]
    MailError { message: String },

    // ==================== Configuration Errors ====================
    /// The configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// A required configuration value is missing.
    #[error("Missing configuration: {key}")]
    MissingConfiguration { key: String },

    // ==================== Internal Errors ====================
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    InternalError { message: String },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl PlannerError {
    /// Creates a new database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::DatabaseError {
            message: message.into(),
        }
    }

    /// Creates a new cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::CacheError {
            message: message.into(),
        }
    }

    /// Creates a new not found error.
    pub fn not_found(
        entity: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a new duplicate entry error.
    pub fn duplicate(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::DuplicateEntry {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a new missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates a new CMS error.
    pub fn cms(message: impl Into<String>) -> Self {
        Self::CmsError {
            message: message.into(),
        }
    }

    /// Creates a new mail error.
    pub fn mail(message: impl Into<String>) -> Self {
        Self::MailError {
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Returns true if this is a user-facing error (vs internal).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::UserNotFound
                | Self::SessionNotFound
                | Self::AccountNotVerified
                | Self::MissingField { .. }
                | Self::InvalidField { .. }
                | Self::InvalidEmail
                | Self::WeakPassword { .. }
                | Self::InvalidActivationCode
                | Self::DuplicateEntry { .. }
                | Self::InvalidToken
                | Self::TokenExpired
                | Self::TokenReused
        )
    }

    /// Returns an HTTP status code appropriate for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials
            | Self::SessionNotFound
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::TokenReused => 401,
            Self::AccountNotVerified => 403,
            Self::UserNotFound | Self::NotFound { .. } => 404,
            Self::DuplicateEntry { .. } => 409,
            Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::InvalidEmail
            | Self::WeakPassword { .. }
            | Self::InvalidActivationCode => 400,
            Self::CmsError { .. } | Self::MailError { .. } => 502,
            _ => 500,
        }
    }

    /// Returns a stable, machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserNotFound => "user_not_found",
            Self::SessionNotFound => "session_not_found",
            Self::AccountNotVerified => "account_not_verified",
            Self::MissingField { .. } => "missing_field",
            Self::InvalidField { .. } => "invalid_field",
            Self::InvalidEmail => "invalid_email",
            Self::WeakPassword { .. } => "weak_password",
            Self::InvalidActivationCode => "invalid_activation_code",
            Self::DatabaseError { .. } => "database_error",
            Self::CacheError { .. } => "cache_error",
            Self::NotFound { .. } => "not_found",
            Self::DuplicateEntry { .. } => "duplicate_entry",
            Self::InvalidToken => "invalid_token",
            Self::TokenExpired => "token_expired",
            Self::TokenGenerationFailed { .. } => "token_generation_failed",
            Self::TokenReused => "token_reused",
            Self::CmsError { .. } => "cms_error",
            Self::MailError { .. } => "mail_error",
            Self::ConfigurationError { .. } | Self::MissingConfiguration { .. } => {
                "configuration_error"
            }
            Self::InternalError { .. } | Self::SerializationError { .. } => "internal_error",
        }
    }
}

/// A Result type alias using PlannerError.
pub type PlannerResult<T> = Result<T, PlannerError>;

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
        }
    }
}
