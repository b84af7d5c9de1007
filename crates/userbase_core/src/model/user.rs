//! User domain model.
//!
//! # Responsibility
//! - Define the persisted user record and its insert shape.
//! - Keep credential hashes out of every printed or serialized form.
//!
//! # Invariants
//! - `username` and `email` are unique across all rows (enforced by storage).
//! - `password_hash` is an Argon2 PHC string, never plain text.

use crate::auth::password::{hash_password, PasswordError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Surrogate key generated by storage on insert.
pub type UserId = i64;

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User(id={}, username={}, email={})",
            self.id, self.username, self.email
        )
    }
}

/// Insert shape for a user that has no storage identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Builds an insert shape, hashing `password` with a fresh salt.
    ///
    /// # Errors
    /// - Returns `PasswordError` when the hasher rejects the input.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: &str,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password_hash: hash_password(password)?,
        })
    }

    /// Attaches the storage-generated id.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}
