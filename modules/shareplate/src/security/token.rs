//! Stateless session tokens (JWT, HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::model::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// Issues and verifies bearer tokens. Cheap to clone via `Arc` in app state.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: UserRole) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(TokenError::Expired),
            Err(_) => Err(TokenError::Invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use uuid::Uuid;

    use super::{TokenError, TokenSigner};
    use crate::domain::model::UserRole;

    #[test]
    fn issue_then_verify() {
        let signer = TokenSigner::new("test-secret", 24);
        let id = Uuid::new_v4();
        let token = signer.issue(id, UserRole::Restaurant).unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, UserRole::Restaurant);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let signer = TokenSigner::new("secret-a", 24);
        let other = TokenSigner::new("secret-b", 24);
        let token = signer.issue(Uuid::new_v4(), UserRole::Individual).unwrap();
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let signer = TokenSigner::new("test-secret", -1);
        let token = signer.issue(Uuid::new_v4(), UserRole::Admin).unwrap();
        assert!(matches!(signer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn garbage_is_invalid() {
        let signer = TokenSigner::new("test-secret", 24);
        assert!(matches!(
            signer.verify("not.a.jwt"),
            Err(TokenError::Invalid)
        ));
    }
}
