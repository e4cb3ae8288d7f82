//! Opaque refresh-token generation and hashing.
//!
//! Raw tokens are 256 random bits, base64url without padding. Only the
//! peppered SHA-256 of a raw token is ever stored.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Number of random bytes in a refresh token.
pub const TOKEN_BYTES: usize = 32;

/// Generate a fresh raw refresh token.
pub fn generate() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hashes raw refresh tokens with a server-side pepper.
#[derive(Clone)]
pub struct RefreshTokenHasher {
    pepper: String,
}

impl std::fmt::Debug for RefreshTokenHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenHasher").finish_non_exhaustive()
    }
}

impl RefreshTokenHasher {
    pub fn new(pepper: impl Into<String>) -> Self {
        Self {
            pepper: pepper.into(),
        }
    }

    /// Lower-case hex SHA-256 of `pepper:raw`.
    pub fn hash(&self, raw: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.pepper.as_bytes());
        hasher.update(b":");
        hasher.update(raw.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = generate();
        // 32 bytes -> 43 base64url chars without padding
        assert_eq!(token.len(), 43);
        assert!(!token.contains('='));
        assert!(!token.contains('+') && !token.contains('/'));
        assert_ne!(token, generate());
    }

    #[test]
    fn test_hash_is_stable_and_peppered() {
        let a = RefreshTokenHasher::new("pepper-a");
        let b = RefreshTokenHasher::new("pepper-b");

        assert_eq!(a.hash("token"), a.hash("token"));
        assert_ne!(a.hash("token"), b.hash("token"));
        assert_eq!(a.hash("token").len(), 64);
        assert_ne!(a.hash("token"), "token");
    }
}
