//! # Day Planner Auth
//!
//! The account and session lifecycle:
//!
//! 1. `register` hashes the password and mails a 4-digit code. The pending
//!    registration travels inside a signed activation token; nothing is
//!    stored yet.
//! 2. `activate` checks token and code, then persists a verified user.
//! 3. `login` issues an access/refresh pair and caches a [`Session`] under the
//!    user id.
//! 4. `refresh` rotates the pair. Only the refresh token recorded on the
//!    session may rotate it; presenting an older one revokes the session.
//! 5. `logout` drops the cached session.

mod config;
mod requests;

pub use config::AuthConfig;
pub use requests::{
    AuthOutcome, LoginRequest, RegistrationOutcome, RegistrationRequest, UpdateProfile,
};

use chrono::Utc;
use dayplanner_core::error::{PlannerError, PlannerResult};
use dayplanner_core::mail;
use dayplanner_core::traits::{Mailer, SessionCache, UserStore};
use dayplanner_core::types::{NewUser, Session, User, UserProfile};
use dayplanner_core::validation::{normalize_email, require, require_secret, validate_email};
use dayplanner_password::PasswordHasher;
use dayplanner_tokens::TokenService;
use std::sync::Arc;

/// Orchestrates the auth lifecycle over the store, cache and mail collaborators.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionCache>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenService,
    hasher: PasswordHasher,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionCache>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenService,
        hasher: PasswordHasher,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            mailer,
            tokens,
            hasher,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Starts a registration and mails the activation code.
    pub async fn register(&self, request: RegistrationRequest) -> PlannerResult<RegistrationOutcome> {
        let name = require("name", &request.name)?.to_string();
        let email = normalize_email(require("email", &request.email)?);
        let password = require_secret("password", &request.password)?;

        validate_email(&email)?;
        self.hasher.check_policy(password)?;

        if self.users.email_exists(&email).await? {
            return Err(PlannerError::duplicate("user", "email", &email));
        }

        let pending = NewUser {
            name,
            email: email.clone(),
            password_hash: self.hasher.hash(password)?,
            avatar: request.avatar.filter(|a| !a.trim().is_empty()),
        };
        let ticket = self.tokens.issue_activation(pending.clone())?;

        let message = mail::activation_email(
            &self.config.app_name,
            &pending.name,
            &pending.email,
            &ticket.activation_code,
            self.tokens.config().activation_token_ttl.num_minutes(),
        );
        self.mailer.send(&message).await.map_err(|err| {
            tracing::error!(email = %email, error = %err, "Failed to send activation email");
            err
        })?;

        tracing::info!(email = %email, "Registration pending activation");
        Ok(RegistrationOutcome {
            email,
            activation_token: ticket.token,
        })
    }

    /// Completes a registration and persists the user.
    pub async fn activate(&self, token: &str, code: &str) -> PlannerResult<UserProfile> {
        let token = require("activation_token", token)?;
        let code = require("activation_code", code)?;

        let pending = self.tokens.verify_activation(token, code)?;

        if self.users.email_exists(&pending.email).await? {
            return Err(PlannerError::duplicate("user", "email", &pending.email));
        }

        let user = self.users.create_user(&User::from_registration(pending)).await?;
        tracing::info!(user_id = %user.id, email = %user.email, "User activated");
        Ok(user.profile())
    }

    /// Verifies credentials, issues tokens and caches the session.
    pub async fn login(&self, request: LoginRequest) -> PlannerResult<AuthOutcome> {
        let email = normalize_email(require("email", &request.email)?);
        let password = require_secret("password", &request.password)?;

        let user = match self.users.get_user_by_email(&email).await? {
            Some(user) if self.hasher.verify(password, &user.password_hash) => user,
            Some(_) => {
                tracing::warn!(email = %email, "Failed login attempt");
                return Err(PlannerError::InvalidCredentials);
            }
            None => {
                // Same argon2 cost as a wrong password.
                self.hasher.verify_dummy(password);
                tracing::warn!(email = %email, "Failed login attempt");
                return Err(PlannerError::InvalidCredentials);
            }
        };

        if self.config.require_verified && !user.is_verified {
            return Err(PlannerError::AccountNotVerified);
        }

        let tokens = self.tokens.issue_pair(&user.id)?;
        let session = Session::new(user.profile(), &tokens.refresh_jti, self.config.session_ttl);
        self.sessions
            .put(&user.id, &session, self.config.session_ttl)
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AuthOutcome {
            user: session.user,
            tokens,
        })
    }

    /// Drops the cached session. Logging out twice is not an error.
    pub async fn logout(&self, user_id: &str) -> PlannerResult<()> {
        self.sessions.remove(user_id).await?;
        tracing::info!(user_id, "User logged out");
        Ok(())
    }

    /// Rotates the token pair.
    pub async fn refresh(&self, refresh_token: &str) -> PlannerResult<AuthOutcome> {
        let claims = self.tokens.verify_refresh(refresh_token)?;
        let mut session = self.live_session(&claims.sub).await?;

        if session.refresh_jti != claims.jti {
            tracing::warn!(user_id = %claims.sub, "Refresh token reuse detected, revoking session");
            self.sessions.remove(&claims.sub).await?;
            return Err(PlannerError::TokenReused);
        }

        let tokens = self.tokens.issue_pair(&claims.sub)?;
        session.rotate(&tokens.refresh_jti, self.config.session_ttl);
        self.sessions
            .put(&claims.sub, &session, self.config.session_ttl)
            .await?;

        tracing::debug!(user_id = %claims.sub, "Tokens rotated");
        Ok(AuthOutcome {
            user: session.user,
            tokens,
        })
    }

    /// Resolves an access token to its cached session.
    pub async fn authenticate(&self, access_token: &str) -> PlannerResult<Session> {
        let claims = self.tokens.verify_access(access_token)?;
        self.live_session(&claims.sub).await
    }

    /// Loads the stored user.
    pub async fn current_user(&self, user_id: &str) -> PlannerResult<UserProfile> {
        Ok(self.load_user(user_id).await?.profile())
    }

    /// Updates name and/or avatar.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: UpdateProfile,
    ) -> PlannerResult<UserProfile> {
        let mut user = self.load_user(user_id).await?;

        if let Some(ref name) = update.name {
            user.name = require("name", name)?.to_string();
        }
        if let Some(avatar) = update.avatar {
            let avatar = avatar.trim();
            user.avatar = (!avatar.is_empty()).then(|| avatar.to_string());
        }
        user.touch();

        let user = self.users.update_user(&user).await?;
        let profile = user.profile();
        self.sync_session(user_id, &profile).await?;

        tracing::info!(user_id, "Profile updated");
        Ok(profile)
    }

    /// Changes the password after checking the current one.
    pub async fn update_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> PlannerResult<()> {
        let old_password = require_secret("old_password", old_password)?;
        let new_password = require_secret("new_password", new_password)?;

        let mut user = self.load_user(user_id).await?;
        if !self.hasher.verify(old_password, &user.password_hash) {
            tracing::warn!(user_id, "Password change rejected");
            return Err(PlannerError::InvalidCredentials);
        }

        self.hasher.check_policy(new_password)?;
        user.password_hash = self.hasher.hash(new_password)?;
        user.touch();
        self.users.update_user(&user).await?;

        tracing::info!(user_id, "Password updated");
        Ok(())
    }

    async fn load_user(&self, user_id: &str) -> PlannerResult<User> {
        self.users
            .get_user_by_id(user_id)
            .await?
            .ok_or(PlannerError::UserNotFound)
    }

    async fn live_session(&self, user_id: &str) -> PlannerResult<Session> {
        match self.sessions.get(user_id).await? {
            Some(session) if !session.is_expired() => Ok(session),
            _ => Err(PlannerError::SessionNotFound),
        }
    }

    /// Keeps the cached user copy in step with the store, preserving the remaining TTL.
    async fn sync_session(&self, user_id: &str, profile: &UserProfile) -> PlannerResult<()> {
        let Some(mut session) = self.sessions.get(user_id).await? else {
            return Ok(());
        };

        let remaining = session.expires_at - Utc::now();
        if remaining <= chrono::Duration::zero() {
            return Ok(());
        }

        session.user = profile.clone();
        session.updated_at = Utc::now();
        self.sessions.put(user_id, &session, remaining).await
    }
}
