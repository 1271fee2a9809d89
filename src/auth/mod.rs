// JWT claims and token issuing
pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::user::{User, UserRole};

/// Distinguishes short-lived access tokens from long-lived refresh tokens.
/// A refresh token presented on an access-guarded route is rejected, and
/// vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub token_use: TokenUse,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User, token_use: TokenUse) -> Self {
        let now = Utc::now();
        let ttl_secs = match token_use {
            TokenUse::Access => config::config().security.access_token_ttl_secs,
            TokenUse::Refresh => config::config().security.refresh_token_ttl_secs,
        };

        Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            token_use,
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Decode and verify a token, including expiry.
pub fn decode_jwt(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = &config::config().security.jwt_secret;
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    decode::<Claims>(token, &decoding_key, &Validation::default()).map(|data| data.claims)
}

/// Access + refresh tokens as returned by register/login/refresh.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub fn issue_token_pair(user: &User) -> Result<TokenPair, JwtError> {
    let access_token = generate_jwt(&Claims::new(user, TokenUse::Access))?;
    let refresh_token = generate_jwt(&Claims::new(user, TokenUse::Refresh))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        expires_in: config::config().security.access_token_ttl_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "shopper@example.com".to_string(),
            password_hash: "x".to_string(),
            name: "Shopper".to_string(),
            role: UserRole::Customer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_claims_roundtrip() {
        let user = test_user();
        let claims = Claims::new(&user, TokenUse::Access);
        let token = generate_jwt(&claims).unwrap();

        let decoded = decode_jwt(&token).unwrap();
        assert_eq!(decoded.sub, user.id);
        assert_eq!(decoded.email, user.email);
        assert_eq!(decoded.token_use, TokenUse::Access);
    }

    #[test]
    fn test_refresh_outlives_access() {
        let user = test_user();
        let access = Claims::new(&user, TokenUse::Access);
        let refresh = Claims::new(&user, TokenUse::Refresh);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(decode_jwt("not-a-token").is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let user = test_user();
        let token = generate_jwt(&Claims::new(&user, TokenUse::Access)).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(decode_jwt(&tampered).is_err());
    }
}
