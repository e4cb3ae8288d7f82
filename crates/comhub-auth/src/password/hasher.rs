//! Argon2id password hashing and verification.

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use comhub_core::error::AppError;

/// Hash of a random secret, built on first use by [`PasswordHasher::verify_dummy`].
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch; a malformed stored hash is an
    /// internal error.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Runs a full Argon2id verification against a hash of a random secret.
    ///
    /// Login calls this when there is no stored hash to check, so an unknown
    /// email costs the same as a wrong password. Never returns `true`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let hash = DUMMY_HASH.get_or_init(|| {
            let secret = SaltString::generate(&mut OsRng);
            self.hash_password(secret.as_str()).ok()
        });
        if let Some(hash) = hash {
            let _ = self.verify_password(password, hash);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("Tr1cky-Passw0rd!").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("Tr1cky-Passw0rd!", &hash).unwrap());
        assert!(!hasher.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_internal() {
        let err = PasswordHasher::new().verify_password("x", "plain").unwrap_err();
        assert_eq!(err.kind, comhub_core::ErrorKind::Internal);
    }

    #[test]
    fn test_verify_dummy_never_matches() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify_dummy(""));
        assert!(!hasher.verify_dummy("Tr1cky-Passw0rd!"));

        let hash = DUMMY_HASH.get().cloned().flatten().unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }
}
