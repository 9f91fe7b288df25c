use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core_types::UserId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to issue token: {0}")]
    Issue(String),

    #[error("Invalid or expired token")]
    Invalid,
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

impl Claims {
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

/// Authenticated caller, inserted into request extensions by the middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// HS256 bearer tokens. Callers only ever see the opaque string.
#[derive(Clone)]
pub struct TokenService {
    jwt_secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(jwt_secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Issue("expiry out of range".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| TokenError::Issue(e.to_string()))
    }

    /// Verify JWT token
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(|_| TokenError::Invalid)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenService::new("secret", 1);
        let token = tokens.issue(42).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("secret", 1).issue(42).unwrap();
        assert_eq!(
            TokenService::new("other", 1).verify(&token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_expired_rejected() {
        // Past the default 60s leeway.
        let tokens = TokenService::new("secret", -1);
        let token = tokens.issue(7).unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = TokenService::new("secret", 1);
        assert_eq!(tokens.verify("not.a.jwt"), Err(TokenError::Invalid));
    }
}
