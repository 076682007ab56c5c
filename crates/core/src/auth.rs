//! Password hashing and credential rules.

use thiserror::Error;
use tracing::debug;

/// bcrypt work factor. Existing hashes embed their own cost, so changing this
/// only affects newly registered accounts.
pub const PASSWORD_COST: u32 = 4;

/// Longest password accepted at registration.
pub const MAX_PASSWORD_LEN: usize = 50;

/// Reasons a registration field is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Username was blank.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password length outside 1..=50 characters.
    #[error("password must be between 1 and {} characters", MAX_PASSWORD_LEN)]
    PasswordLength,
}

/// Hash a password with a fresh per-user salt.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, PASSWORD_COST)
}

/// Check `password` against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(err) => {
            debug!(?err, "stored password hash could not be verified");
            false
        }
    }
}

/// Validate a username typed at registration.
pub fn validate_username(username: &str) -> Result<(), CredentialError> {
    if username.trim().is_empty() {
        return Err(CredentialError::EmptyUsername);
    }
    Ok(())
}

/// Validate a password typed at registration.
pub fn validate_password(password: &str) -> Result<(), CredentialError> {
    let len = password.chars().count();
    if len == 0 || len > MAX_PASSWORD_LEN {
        return Err(CredentialError::PasswordLength);
    }
    Ok(())
}
