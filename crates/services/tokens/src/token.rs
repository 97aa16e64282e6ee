//! JWT token encoding and decoding.

use chrono::Duration;
use dayplanner_core::error::PlannerError;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type for JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token decoding failed: {0}")]
    DecodingFailed(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Unexpected token kind")]
    WrongKind,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            ErrorKind::InvalidToken => JwtError::Invalid,
            _ => JwtError::DecodingFailed(err.to_string()),
        }
    }
}

impl From<JwtError> for PlannerError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => PlannerError::TokenExpired,
            JwtError::EncodingFailed(reason) => PlannerError::TokenGenerationFailed { reason },
            JwtError::DecodingFailed(_)
            | JwtError::Invalid
            | JwtError::InvalidSignature
            | JwtError::WrongKind => PlannerError::InvalidToken,
        }
    }
}

/// JWT token encoder/decoder for a single HMAC secret.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl JwtCodec {
    /// Creates a new JWT codec with a symmetric secret (HMAC).
    ///
    /// Expiration is enforced to the second; no clock leeway is granted.
    pub fn new_symmetric(secret: &[u8], algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
        }
    }

    /// Creates a new JWT codec with HS256 algorithm.
    pub fn hs256(secret: &str) -> Self {
        Self::new_symmetric(secret.as_bytes(), Algorithm::HS256)
    }

    /// Sets the expected issuer for validation.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.validation.set_issuer(&[issuer.into()]);
        self
    }

    /// Encodes claims into a JWT token.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decodes a JWT token into claims.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<TokenData<T>, JwtError> {
        decode::<T>(token, &self.decoding_key, &self.validation).map_err(JwtError::from)
    }

    /// Returns the algorithm used by this codec.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

/// Token pair containing access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// The access token.
    pub access_token: String,
    /// The refresh token.
    pub refresh_token: String,
    /// JWT id of the refresh token, recorded on the session for rotation.
    #[serde(skip)]
    pub refresh_jti: String,
    /// Access token type (always "Bearer").
    pub token_type: String,
    /// Access token expiration in seconds.
    pub expires_in: u64,
    /// Refresh token expiration in seconds.
    pub refresh_expires_in: u64,
}

impl TokenPair {
    /// Creates a new token pair.
    pub fn new(
        access_token: String,
        refresh_token: String,
        refresh_jti: String,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            refresh_jti,
            token_type: "Bearer".to_string(),
            expires_in: access_ttl.num_seconds().max(0) as u64,
            refresh_expires_in: refresh_ttl.num_seconds().max(0) as u64,
        }
    }
}
