//! Argon2id password hashing for the local credential backend.

use argon2::password_hash::{self, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Hashes a password into a PHC string (`$argon2id$...`).
///
/// CPU-bound; call it from a blocking task.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks a password against a PHC string produced by [`hash_password`].
///
/// A stored hash that cannot be parsed never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Unparseable stored password hash: {}", e);
            false
        }
    }
}
