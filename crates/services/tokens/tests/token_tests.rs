//! Integration tests for the token service
//!
//! Tests cover:
//! - Token shape and header
//! - Malformed and tampered tokens
//! - Activation flow
//! - Issuer enforcement

use chrono::Duration;
use dayplanner_core::error::PlannerError;
use dayplanner_core::types::NewUser;
use dayplanner_tokens::*;

fn service() -> TokenService {
    TokenService::new(TokenConfig::new(
        "access-secret",
        "refresh-secret",
        "activation-secret",
    ))
}

fn pending(email: &str) -> NewUser {
    NewUser {
        name: "Grace".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$fake".to_string(),
        avatar: Some("https://cdn.example.com/grace.png".to_string()),
    }
}

mod token_shape_tests {
    use super::*;

    #[test]
    fn test_tokens_have_three_parts() {
        let pair = service().issue_pair("user123").unwrap();
        assert_eq!(pair.access_token.split('.').count(), 3);
        assert_eq!(pair.refresh_token.split('.').count(), 3);
    }

    #[test]
    fn test_header_uses_hs256() {
        let pair = service().issue_pair("user123").unwrap();
        let header = jsonwebtoken::decode_header(&pair.access_token).unwrap();
        assert_eq!(header.alg, jsonwebtoken::Algorithm::HS256);
    }

    #[test]
    fn test_pairs_are_unique() {
        let tokens = service();
        let first = tokens.issue_pair("user123").unwrap();
        let second = tokens.issue_pair("user123").unwrap();
        assert_ne!(first.refresh_jti, second.refresh_jti);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_refresh_jti_not_serialized() {
        let pair = service().issue_pair("user123").unwrap();
        let json = serde_json::to_value(&pair).unwrap();
        assert!(json.get("refresh_jti").is_none());
        assert_eq!(json["token_type"], "Bearer");
    }
}

mod token_validation_tests {
    use super::*;

    #[test]
    fn test_verify_malformed_token() {
        let tokens = service();
        for token in ["not.a.jwt", "only.two", "invalid_base64!@#$%", ""] {
            assert!(
                matches!(tokens.verify_access(token), Err(PlannerError::InvalidToken)),
                "Malformed token '{token}' should fail"
            );
        }
    }

    #[test]
    fn test_verify_tampered_token() {
        let tokens = service();
        let pair = tokens.issue_pair("user123").unwrap();

        let mut parts: Vec<String> = pair.access_token.split('.').map(String::from).collect();
        parts[1] = "eyJzdWIiOiJhZG1pbiJ9".to_string();
        let tampered = parts.join(".");

        assert!(tokens.verify_access(&tampered).is_err());
    }

    #[test]
    fn test_other_deployment_secret_rejected() {
        let pair = service().issue_pair("user123").unwrap();
        let other = TokenService::new(TokenConfig::new("x", "y", "z"));
        assert!(other.verify_access(&pair.access_token).is_err());
        assert!(other.verify_refresh(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_expired_access_token() {
        let tokens = TokenService::new(
            TokenConfig::new("a", "r", "x").access_token_ttl(Duration::seconds(-30)),
        );
        let pair = tokens.issue_pair("user123").unwrap();
        assert!(matches!(
            tokens.verify_access(&pair.access_token),
            Err(PlannerError::TokenExpired)
        ));
        // The refresh token keeps its own TTL.
        assert!(tokens.verify_refresh(&pair.refresh_token).is_ok());
    }
}

mod activation_tests {
    use super::*;

    #[test]
    fn test_activation_carries_registration() {
        let tokens = service();
        let ticket = tokens.issue_activation(pending("grace@example.com")).unwrap();
        let user = tokens
            .verify_activation(&ticket.token, &ticket.activation_code)
            .unwrap();
        assert_eq!(user.email, "grace@example.com");
        assert_eq!(user.avatar.as_deref(), Some("https://cdn.example.com/grace.png"));
    }

    #[test]
    fn test_activation_code_whitespace_tolerated() {
        let tokens = service();
        let ticket = tokens.issue_activation(pending("grace@example.com")).unwrap();
        let padded = format!(" {} ", ticket.activation_code);
        assert!(tokens.verify_activation(&ticket.token, &padded).is_ok());
    }

    #[test]
    fn test_activation_token_does_not_reveal_code() {
        let tokens = service();
        let ticket = tokens.issue_activation(pending("grace@example.com")).unwrap();

        // Anyone holding the token can read its payload without the secret.
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let payload = jsonwebtoken::decode::<serde_json::Value>(
            &ticket.token,
            &jsonwebtoken::DecodingKey::from_secret(b""),
            &validation,
        )
        .unwrap()
        .claims;

        let payload = payload.as_object().unwrap();
        assert!(!payload.contains_key("activation_code"));
        assert!(
            payload
                .values()
                .all(|v| v.as_str() != Some(ticket.activation_code.as_str()))
        );

        let digest = payload["code_digest"].as_str().unwrap();
        assert_eq!(digest.len(), 64);
        assert!(matches!(
            tokens.verify_activation(&ticket.token, digest),
            Err(PlannerError::InvalidActivationCode)
        ));
    }

    #[test]
    fn test_activation_code_is_bound_to_its_token() {
        let tokens = service();
        let first = tokens.issue_activation(pending("grace@example.com")).unwrap();
        let second = tokens.issue_activation(pending("grace@example.com")).unwrap();

        if first.activation_code != second.activation_code {
            assert!(matches!(
                tokens.verify_activation(&second.token, &first.activation_code),
                Err(PlannerError::InvalidActivationCode)
            ));
        }
        assert!(tokens
            .verify_activation(&second.token, &second.activation_code)
            .is_ok());
    }

    #[test]
    fn test_access_token_is_not_an_activation_token() {
        let tokens = service();
        let pair = tokens.issue_pair("user123").unwrap();
        assert!(matches!(
            tokens.verify_activation(&pair.access_token, "1234"),
            Err(PlannerError::InvalidToken)
        ));
    }
}

mod issuer_tests {
    use super::*;

    #[test]
    fn test_issuer_round_trip() {
        let tokens = TokenService::new(TokenConfig::new("a", "r", "x").issuer("dayplanner"));
        let pair = tokens.issue_pair("user123").unwrap();
        let claims = tokens.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.iss.as_deref(), Some("dayplanner"));
    }

    #[test]
    fn test_issuer_mismatch_rejected() {
        let issuing = TokenService::new(TokenConfig::new("a", "r", "x").issuer("other"));
        let checking = TokenService::new(TokenConfig::new("a", "r", "x").issuer("dayplanner"));
        let pair = issuing.issue_pair("user123").unwrap();
        assert!(checking.verify_access(&pair.access_token).is_err());
    }
}
