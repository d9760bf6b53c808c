//! Signed, time-limited tokens (HS256 JWT)

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Payload carried by a token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique per token, so two tokens issued in the same second differ
    pub jti: String,
}

/// Issues and verifies tokens with one shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self::with_ttl(
            secret,
            chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        )
    }

    fn with_ttl(secret: &str, ttl: chrono::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Sign a new token for a user
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user_id.to_owned(),
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .ok_or_else(|| Error::Config("Token lifetime is too large".into()))?
                .timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry, returning the decoded claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = issuer();
        let token = tokens.issue("123456789", "ada@example.com").unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.user_id, "123456789");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_tokens_differ() {
        let tokens = issuer();
        let a = tokens.issue("1", "a@x.com").unwrap();
        let b = tokens.issue("1", "a@x.com").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue("1", "a@x.com").unwrap();
        let other = TokenIssuer::new("other-secret", Duration::from_secs(3600));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_rejected() {
        // Past the default 60 second leeway
        let tokens = TokenIssuer::with_ttl("test-secret", chrono::Duration::seconds(-120));
        let token = tokens.issue("1", "a@x.com").unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(issuer().verify("not.a.token").is_err());
        assert!(issuer().verify("").is_err());
    }
}
