//! Password hashing and verification using bcrypt

use crate::config::{AppConfig, DEFAULT_BCRYPT_COST};
use thiserror::Error;

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Entropy or allocation failure inside the hash function
    #[error("failed to hash secret: {0}")]
    Hashing(String),

    /// Stored hash is not a valid bcrypt string
    #[error("stored hash is malformed: {0}")]
    MalformedHash(String),

    #[error("secret does not match")]
    Mismatch,
}

/// bcrypt password hasher
///
/// Stateless apart from the cost factor, so a single instance can be shared
/// across requests behind an `Arc` without locking.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create hasher with the default cost (14)
    pub fn new() -> Self {
        Self::with_cost(DEFAULT_BCRYPT_COST)
    }

    /// Create hasher with an explicit cost factor
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_cost(config.security.bcrypt_cost)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a secret. The salt is random and embedded in the output.
    pub fn hash(&self, secret: &str) -> Result<String, PasswordError> {
        bcrypt::hash(secret, self.cost).map_err(|e| {
            tracing::error!("Failed to hash secret: {:?}", e);
            PasswordError::Hashing(e.to_string())
        })
    }

    /// Verify a secret against a stored hash.
    ///
    /// bcrypt recomputes the digest with the embedded salt and cost and
    /// compares in constant time.
    pub fn verify(&self, secret: &str, hash: &str) -> Result<(), PasswordError> {
        match bcrypt::verify(secret, hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(PasswordError::Mismatch),
            Err(e) => {
                tracing::debug!("Failed to parse stored hash: {:?}", e);
                Err(PasswordError::MalformedHash(e.to_string()))
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BCRYPT_MIN_COST;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(BCRYPT_MIN_COST)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw1").unwrap();
        hasher.verify("pw1", &hash).unwrap();
    }

    #[test]
    fn test_verify_fails_with_wrong_secret() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw1").unwrap();
        assert!(matches!(
            hasher.verify("wrong", &hash),
            Err(PasswordError::Mismatch)
        ));
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = fast_hasher();

        let hash1 = hasher.hash("pw1").unwrap();
        let hash2 = hasher.hash("pw1").unwrap();

        assert_ne!(hash1, hash2);
        hasher.verify("pw1", &hash1).unwrap();
        hasher.verify("pw1", &hash2).unwrap();
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw1").unwrap();
        assert!(!hash.contains("pw1"));
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_default_cost_is_embedded() {
        let hasher = PasswordHasher::new();
        assert_eq!(hasher.cost(), 14);

        let hash = hasher.hash("pw1").unwrap();
        // $2b$14$...
        assert_eq!(&hash[4..6], "14");
        hasher.verify("pw1", &hash).unwrap();
    }

    #[test]
    fn test_malformed_hash() {
        let hasher = fast_hasher();
        assert!(matches!(
            hasher.verify("pw1", "not-a-bcrypt-hash"),
            Err(PasswordError::MalformedHash(_))
        ));
    }
}
