//! Password Service
//!
//! Argon2id hashing with a random salt per password. Verification re-derives
//! the hash with the parameters encoded in the stored PHC string and compares
//! in constant time.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{PlatformError, Result};

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Config {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Rules a new password must satisfy
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_length {
            return Err(PlatformError::validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PasswordService {
    config: Argon2Config,
    policy: PasswordPolicy,
}

impl PasswordService {
    pub fn new(config: Argon2Config) -> Self {
        Self {
            config,
            policy: PasswordPolicy::default(),
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.config.memory_kib,
            self.config.iterations,
            self.config.parallelism,
            None,
        )
        .map_err(|e| PlatformError::configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a plaintext password into a PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PlatformError::internal(format!("Password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when `hash` is not a valid PHC string.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| PlatformError::internal(format!("Malformed password hash: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PlatformError::internal(format!("Password verification failed: {}", e))),
        }
    }

    /// Spend the same argon2 work as a real verification and report a mismatch.
    /// Used when no stored hash exists so lookups of unknown accounts take as
    /// long as a wrong password.
    pub fn verify_absent(&self, password: &str) -> Result<bool> {
        let salt = SaltString::from_b64(ABSENT_ACCOUNT_SALT)
            .map_err(|e| PlatformError::internal(format!("Invalid salt: {}", e)))?;
        self.hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PlatformError::internal(format!("Password hashing failed: {}", e)))?;
        Ok(false)
    }
}

const ABSENT_ACCOUNT_SALT: &str = "ZXZlbnRodWJhYnNlbnRzYWx0";

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_service() -> PasswordService {
        PasswordService::new(Argon2Config {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_hash_and_verify() {
        let service = fast_service();
        let hash = service.hash_password("password123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify_password("password123", &hash).unwrap());
        assert!(!service.verify_password("password124", &hash).unwrap());
        assert!(!service.verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = fast_service();
        let a = service.hash_password("password123").unwrap();
        let b = service.hash_password("password123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let service = fast_service();
        assert!(service.verify_password("password123", "plaintext-not-a-hash").is_err());
    }

    #[test]
    fn test_verify_absent_never_matches() {
        let service = fast_service();
        assert!(!service.verify_absent("password123").unwrap());
        assert!(!service.verify_absent("").unwrap());
    }

    #[test]
    fn test_policy_min_length() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("short").is_err());
        assert!(policy.validate("12345678").is_ok());
    }

    #[test]
    fn test_invalid_cost_parameters() {
        let service = PasswordService::new(Argon2Config {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(service.hash_password("password123").is_err());
    }
}
