//! User administration use-case service.
//!
//! # Responsibility
//! - Provide one entry point per administrative command.
//! - Resolve usernames to stored rows before mutating them.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.
//! - A missing username is reported as `RepoError::NotFound(username)` and
//!   no write is issued.

use crate::model::user::{NewUser, User};
use crate::repo::user_repo::{RepoError, RepoResult, UserListQuery, UserRepository};
use log::info;

/// Use-case service wrapper for user administration.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Hashes `password` and inserts a new user.
    ///
    /// # Contract
    /// - Duplicate username or email returns `RepoError::Conflict`.
    /// - Returns the stored user with its generated id.
    pub fn create_user(&self, username: &str, email: &str, password: &str) -> RepoResult<User> {
        let new_user = NewUser::new(username, email, password)?;
        let user = self.repo.create_user(&new_user)?;
        info!(
            "event=user_create module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Returns users whose username or email contains `query`.
    pub fn find_users(&self, query: &str) -> RepoResult<Vec<User>> {
        self.repo.search_users(query)
    }

    /// Returns one page of users in insertion order.
    pub fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        self.repo.list_users(query)
    }

    /// Replaces the email of the user named `username`.
    ///
    /// Returns the updated user.
    pub fn change_email(&self, username: &str, new_email: &str) -> RepoResult<User> {
        let mut user = self.require_user(username)?;
        self.repo.update_email(user.id, new_email)?;
        user.email = new_email.to_string();
        info!(
            "event=user_change_email module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Deletes the user named `username` and returns the removed row.
    pub fn delete_user(&self, username: &str) -> RepoResult<User> {
        let user = self.require_user(username)?;
        self.repo.delete_user(user.id)?;
        info!(
            "event=user_delete module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    fn require_user(&self, username: &str) -> RepoResult<User> {
        self.repo
            .get_by_username(username)?
            .ok_or_else(|| RepoError::NotFound(username.to_string()))
    }
}
