//! Password hashing.
//!
//! # Invariants
//! - Hashes are Argon2id PHC strings with a per-password random salt.
//! - Plain-text passwords are never logged or persisted.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Hashing or hash-parsing failure.
#[derive(Debug)]
pub enum PasswordError {
    Hash(argon2::password_hash::Error),
}

impl Display for PasswordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash(err) => write!(f, "password hashing failed: {err}"),
        }
    }
}

impl Error for PasswordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hash(err) => Some(err),
        }
    }
}

impl From<argon2::password_hash::Error> for PasswordError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::Hash(value)
    }
}

/// Hashes `password` with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch and `Err` only when `password_hash`
/// cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(password_hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn hash_is_phc_and_never_plain_text() {
        let hash = hash_password("bobpass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("bobpass"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password("bobpass").unwrap();
        let second = hash_password("bobpass").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn verify_accepts_original_and_rejects_others() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }
}
