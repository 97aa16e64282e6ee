//! Keyed digests of activation codes.
//!
//! Activation tokens are handed to the client, so they carry an
//! HMAC-SHA256 of the code instead of the code itself.

use dayplanner_core::error::{PlannerError, PlannerResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs and checks activation codes with the activation secret.
#[derive(Clone)]
pub struct CodeDigest {
    secret: Vec<u8>,
}

impl CodeDigest {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Hex digest binding `code` to one token (`jti`) and one address.
    pub fn sign(&self, jti: &str, email: &str, code: &str) -> PlannerResult<String> {
        let mac = self
            .mac(jti, email, code)
            .ok_or_else(|| PlannerError::TokenGenerationFailed {
                reason: "invalid activation key".to_string(),
            })?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check of `code` against a digest from [`sign`](Self::sign).
    pub fn verify(&self, digest: &str, jti: &str, email: &str, code: &str) -> bool {
        let Ok(expected) = hex::decode(digest) else {
            return false;
        };
        self.mac(jti, email, code)
            .is_some_and(|mac| mac.verify_slice(&expected).is_ok())
    }

    /// Length-prefixed parts so `("ab", "c")` and `("a", "bc")` differ.
    fn mac(&self, jti: &str, email: &str, code: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        for part in [jti, email, code] {
            mac.update(&(part.len() as u64).to_be_bytes());
            mac.update(part.as_bytes());
        }
        Some(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let digest = CodeDigest::new("activation-secret");
        let signed = digest.sign("jti-1", "ada@example.com", "0042").unwrap();

        assert_eq!(signed.len(), 64);
        assert!(digest.verify(&signed, "jti-1", "ada@example.com", "0042"));
        assert!(!digest.verify(&signed, "jti-1", "ada@example.com", "0043"));
    }

    #[test]
    fn test_digest_is_bound_to_token_and_email() {
        let digest = CodeDigest::new("activation-secret");
        let signed = digest.sign("jti-1", "ada@example.com", "0042").unwrap();

        assert!(!digest.verify(&signed, "jti-2", "ada@example.com", "0042"));
        assert!(!digest.verify(&signed, "jti-1", "eve@example.com", "0042"));
    }

    #[test]
    fn test_other_secret_rejects() {
        let signed = CodeDigest::new("a")
            .sign("jti", "ada@example.com", "1234")
            .unwrap();
        assert!(!CodeDigest::new("b").verify(&signed, "jti", "ada@example.com", "1234"));
    }

    #[test]
    fn test_malformed_digest() {
        let digest = CodeDigest::new("s");
        assert!(!digest.verify("not-hex", "jti", "ada@example.com", "1234"));
        assert!(!digest.verify("", "jti", "ada@example.com", "1234"));
    }
}
