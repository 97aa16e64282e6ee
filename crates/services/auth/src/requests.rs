//! Inputs and outputs of the auth operations.

use dayplanner_core::types::UserProfile;
use dayplanner_tokens::TokenPair;
use serde::{Deserialize, Serialize};

/// Sign-up payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Result of a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    /// Normalized address the activation code was sent to.
    pub email: String,
    /// Token to present together with the code on activation.
    pub activation_token: String,
}

/// Sign-in payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// A signed-in user and their fresh tokens.
#[derive(Debug, Clone, Serialize)]
pub struct AuthOutcome {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

/// Profile fields a user may change. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}
