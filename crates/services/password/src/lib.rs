//! # Day Planner Password
//!
//! Password policy checks and argon2 hashing used by registration, login
//! and password changes.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng},
};
use dayplanner_core::error::{PlannerError, PlannerResult};
use std::sync::OnceLock;

/// Hash checked when there is no stored hash to check against.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Password policy configuration.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Minimum password length.
    pub min_length: usize,
    /// Maximum password length.
    pub max_length: usize,
    /// Require uppercase letters.
    pub require_uppercase: bool,
    /// Require lowercase letters.
    pub require_lowercase: bool,
    /// Require numbers.
    pub require_numbers: bool,
    /// Require special characters.
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 128,
            require_uppercase: false,
            require_lowercase: false,
            require_numbers: false,
            require_special: false,
        }
    }
}

impl PasswordPolicy {
    /// Creates a new password policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets minimum password length.
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    /// Sets maximum password length.
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = len;
        self
    }

    /// Requires uppercase letters.
    pub fn require_uppercase(mut self) -> Self {
        self.require_uppercase = true;
        self
    }

    /// Requires lowercase letters.
    pub fn require_lowercase(mut self) -> Self {
        self.require_lowercase = true;
        self
    }

    /// Requires numbers.
    pub fn require_numbers(mut self) -> Self {
        self.require_numbers = true;
        self
    }

    /// Requires special characters.
    pub fn require_special(mut self) -> Self {
        self.require_special = true;
        self
    }

    /// Validates a password against the policy.
    pub fn validate(&self, password: &str) -> Result<(), String> {
        let length = password.chars().count();

        if length < self.min_length {
            return Err(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }

        if length > self.max_length {
            return Err(format!(
                "Password must be at most {} characters",
                self.max_length
            ));
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err("Password must contain at least one uppercase letter".to_string());
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err("Password must contain at least one lowercase letter".to_string());
        }

        if self.require_numbers && !password.chars().any(|c| c.is_numeric()) {
            return Err("Password must contain at least one number".to_string());
        }

        if self.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err("Password must contain at least one special character".to_string());
        }

        Ok(())
    }
}

/// Argon2 password hasher bound to a policy.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    policy: PasswordPolicy,
}

impl PasswordHasher {
    /// Creates a new hasher enforcing the given policy.
    pub fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    /// Gets the policy.
    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Validates a password against the policy.
    pub fn check_policy(&self, password: &str) -> PlannerResult<()> {
        self.policy
            .validate(password)
            .map_err(|reason| PlannerError::WeakPassword { reason })
    }

    /// Hashes a password into an argon2 PHC string with a fresh salt.
    pub fn hash(&self, password: &str) -> PlannerResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PlannerError::internal(format!("password hashing failed: {e}")))
    }

    /// Verifies a password against a stored hash.
    ///
    /// A hash that cannot be parsed never verifies.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                false
            }
        }
    }

    /// Runs a full verification against a throwaway hash and discards the result.
    ///
    /// Lets a lookup miss cost as much as a wrong password.
    pub fn verify_dummy(&self, password: &str) {
        let dummy = DUMMY_HASH.get_or_init(|| self.hash("dayplanner-no-such-account").ok());
        if let Some(hash) = dummy {
            let _ = self.verify(password, hash);
        }
    }
}
