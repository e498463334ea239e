//! API tokens.
//!
//! `POST /api/auth` hands out an HS256 JWT that API clients send back in the
//! `x-auth-token` header. Roles are embedded for the client's benefit only;
//! authorization always re-reads them from the database.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use awesome_store_core::UserId;

use crate::models::User;

/// How long an API token stays valid.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Errors from issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// Bad signature, malformed, or expired.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// Signature checked out but the subject is not a user ID.
    #[error("token subject is not a user id")]
    BadSubject,
}

/// JWT claims embedded in API tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user ID.
    pub sub: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

impl TokenClaims {
    /// The user this token was issued to.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::BadSubject` if `sub` is not numeric.
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub.parse().map_err(|_| TokenError::BadSubject)
    }
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenKeys {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.to_string(),
            roles: user.roles.to_strings(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
            iat: now.timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    /// Verify a token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if the token is malformed, signed with
    /// another key, or expired.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        jsonwebtoken::decode::<TokenClaims>(token.trim(), &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use awesome_store_core::{Email, RoleSet};

    use super::*;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::new(&SecretString::from(secret.to_owned()))
    }

    fn user() -> User {
        User {
            id: UserId::new(42),
            name: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            roles: RoleSet::customer(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys("Tk9#pLm2$Qw8!Zx4&Rv7^Yb1*Nc5@Hd3");
        let token = keys.issue(&user()).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
        assert_eq!(claims.roles, vec!["customer"]);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let token = keys("Tk9#pLm2$Qw8!Zx4&Rv7^Yb1*Nc5@Hd3")
            .issue(&user())
            .unwrap();
        let other = keys("Jm4!vB8@cX2#zN6$qW1%eR5^tY9&uI3*");
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let keys = keys("Tk9#pLm2$Qw8!Zx4&Rv7^Yb1*Nc5@Hd3");
        assert!(keys.verify("not-a-token").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys("Tk9#pLm2$Qw8!Zx4&Rv7^Yb1*Nc5@Hd3");
        let past = Utc::now() - Duration::days(30);
        let claims = TokenClaims {
            sub: "1".to_owned(),
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            roles: vec![],
            exp: past.timestamp(),
            iat: past.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
