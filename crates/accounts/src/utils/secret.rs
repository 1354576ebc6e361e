//! Temporary-secret generation and hashing.
//!
//! Promoted accounts are created with a generated secret the applicant never
//! sees; they set their own through the credential-reset mail.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

const TEMP_SECRET_BYTES: usize = 32;

/// Generate a random temporary secret.
pub fn generate_temp_secret() -> String {
    let mut bytes = [0u8; TEMP_SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a secret using Argon2
pub fn hash_secret(secret: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|_| "Secret hashing failed".to_string())?
        .to_string();

    Ok(hash)
}

/// Verify a secret against its hash
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok()
}
