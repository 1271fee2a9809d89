// Argon2id password hashing and policy checks
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::collections::HashMap;

use crate::config;
use crate::error::ApiError;

/// Enforce the configured password policy.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let min_length = config::config().security.min_password_length;

    if password.len() < min_length {
        let mut fields = HashMap::new();
        fields.insert(
            "password".to_string(),
            vec![format!("password must be at least {} characters", min_length)],
        );
        return Err(ApiError::validation("Request validation failed", fields));
    }

    Ok(())
}

/// Hash a password using Argon2id with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal("An error occurred while processing your request")
        })
}

/// Verify a password against a stored hash. Unparseable hashes count as a
/// mismatch rather than an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_password_rejected() {
        let err = validate_password("short").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_garbage_hash_is_mismatch() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
