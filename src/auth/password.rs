//! Password hashing helpers (argon2id, PHC string format).

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password with a fresh random salt.
pub fn hash(password: &str) -> Result<String> {
    // ---
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?
        .to_string();

    Ok(hash)
}

/// Verify a password against a stored PHC-format hash.
///
/// An unparseable stored hash verifies as false rather than erroring; the
/// caller cannot do anything more useful with that distinction.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    // ---
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
