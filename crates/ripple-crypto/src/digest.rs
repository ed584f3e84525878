use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

/// Hash a secret with Argon2id and a fresh salt. Returns a PHC string.
pub fn digest(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Failed to hash secret: {}", e))
}

/// Check a secret against a stored digest. Malformed digests never match.
pub fn verify(secret: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

/// Remember/activation check: a missing digest authenticates nothing.
pub fn authenticated(digest: Option<&str>, token: &str) -> bool {
    digest.is_some_and(|d| verify(token, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_verifies_only_the_original_secret() {
        let stored = digest("foobar").unwrap();
        assert_ne!(stored, "foobar");
        assert!(verify("foobar", &stored));
        assert!(!verify("foobaz", &stored));
    }

    #[test]
    fn same_secret_gets_distinct_salts() {
        assert_ne!(digest("foobar").unwrap(), digest("foobar").unwrap());
    }

    #[test]
    fn garbage_digest_fails_closed() {
        assert!(!verify("foobar", "not-a-phc-string"));
    }

    #[test]
    fn authenticated_is_false_without_digest() {
        assert!(!authenticated(None, ""));
        let stored = digest("token").unwrap();
        assert!(authenticated(Some(&stored), "token"));
    }
}
