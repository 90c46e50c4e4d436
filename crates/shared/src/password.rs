//! Password hashing utilities using Argon2id.
//!
//! Account activation sets a credential exactly once, so it uses a heavier
//! cost profile than the OWASP interactive-login baseline.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Argon2id parameters for one-time account activation.
/// Heavier than the interactive-login baseline (19 MiB / t=2):
/// - Memory: 65536 KiB (64 MiB)
/// - Iterations: 3
/// - Parallelism: 1
const ACTIVATION_MEMORY_COST: u32 = 65536;
const ACTIVATION_TIME_COST: u32 = 3;
const ACTIVATION_PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn create_activation_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(
        ACTIVATION_MEMORY_COST,
        ACTIVATION_TIME_COST,
        ACTIVATION_PARALLELISM,
        Some(OUTPUT_LEN),
    )
    .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes an activation password using Argon2id.
///
/// Returns a PHC-formatted string that includes the algorithm, parameters,
/// salt, and hash, so the parameters can be upgraded later without breaking
/// stored credentials.
///
/// This is CPU-bound; async callers must dispatch it through
/// `tokio::task::spawn_blocking` rather than calling it inline.
pub fn hash_activation_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_activation_argon2()?;

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC-formatted hash.
///
/// The stored hash carries its own parameters, so verification works across
/// parameter upgrades.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}
