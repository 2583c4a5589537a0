//! Salted one-way hashing of client identifiers

use sha2::{Digest, Sha256};

/// Identifier used when the request carries no usable client address
pub const LOOPBACK_SENTINEL: &str = "127.0.0.1";

/// Length of the hex token stored in place of the raw identifier
pub const HASH_LEN: usize = 16;

/// Deterministic, salted transform from a client identifier to an opaque token.
///
/// The same identifier always maps to the same token for a given secret, which
/// is what makes distinct-token counts usable as an approximate unique visitor
/// count. Tokens are truncated SHA-256 digests, so distinct clients may collide.
#[derive(Clone)]
pub struct IdentifierHasher {
    secret: String,
}

impl IdentifierHasher {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn hash(&self, identifier: &str) -> String {
        let identifier = match identifier.trim() {
            "" => LOOPBACK_SENTINEL,
            trimmed => trimmed,
        };

        let mut hasher = Sha256::new();
        hasher.update(identifier.as_bytes());
        hasher.update(self.secret.as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        digest[..HASH_LEN].to_string()
    }
}

impl std::fmt::Debug for IdentifierHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = IdentifierHasher::new("secret");
        assert_eq!(hasher.hash("203.0.113.7"), hasher.hash("203.0.113.7"));
    }

    #[test]
    fn test_hash_matches_salted_sha256_prefix() {
        let hasher = IdentifierHasher::new("s3cret");
        let expected = format!("{:x}", Sha256::digest(b"10.0.0.1s3cret"));
        assert_eq!(hasher.hash("10.0.0.1"), &expected[..16]);
    }

    #[test]
    fn test_hash_has_fixed_length() {
        let hasher = IdentifierHasher::new("secret");
        let long = "2001:db8::1".repeat(200);
        for input in ["1.1.1.1", long.as_str(), "x"] {
            let token = hasher.hash(input);
            assert_eq!(token.len(), HASH_LEN);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_distinct_identifiers_hash_differently() {
        let hasher = IdentifierHasher::new("secret");
        let tokens: std::collections::HashSet<String> = (0..=255)
            .map(|octet| hasher.hash(&format!("192.168.0.{octet}")))
            .collect();
        assert_eq!(tokens.len(), 256);
    }

    #[test]
    fn test_hash_never_contains_raw_identifier() {
        let hasher = IdentifierHasher::new("secret");
        assert_ne!(hasher.hash("8.8.8.8"), "8.8.8.8");
        assert!(!hasher.hash("8.8.8.8").contains("8.8.8.8"));
    }

    #[test]
    fn test_secret_changes_token() {
        let a = IdentifierHasher::new("one");
        let b = IdentifierHasher::new("two");
        assert_ne!(a.hash("8.8.8.8"), b.hash("8.8.8.8"));
    }

    #[test]
    fn test_empty_identifier_uses_loopback_sentinel() {
        let hasher = IdentifierHasher::new("secret");
        assert_eq!(hasher.hash(""), hasher.hash(LOOPBACK_SENTINEL));
        assert_eq!(hasher.hash("   "), hasher.hash(LOOPBACK_SENTINEL));
    }
}
