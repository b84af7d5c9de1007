//! Database initialization use case.
//!
//! # Responsibility
//! - Reset the schema and insert the seed user.
//!
//! # Invariants
//! - Destructive: every existing row is lost.
//! - Reset and seed share one transaction: after success exactly one user
//!   exists (the seed user); on failure the previous database is untouched.

use crate::db::{reset_schema, Session};
use crate::model::user::User;
use crate::repo::user_repo::{RepoResult, SqliteUserRepository};
use crate::service::user_service::UserService;
use log::info;

pub const SEED_USERNAME: &str = "bob";
pub const SEED_EMAIL: &str = "bob@mail.com";
pub const SEED_PASSWORD: &str = "bobpass";

/// Drops and recreates the schema, then inserts the seed user.
///
/// Accepts sessions from `Session::open_for_reset`, whose schema may be
/// foreign or newer than this binary supports.
pub fn initialize_database(session: &mut Session) -> RepoResult<User> {
    let seed = session.run(|tx| -> RepoResult<User> {
        reset_schema(tx)?;
        let service = UserService::new(SqliteUserRepository::try_new(tx)?);
        service.create_user(SEED_USERNAME, SEED_EMAIL, SEED_PASSWORD)
    })?;

    info!(
        "event=db_initialize module=service status=ok seed_user_id={}",
        seed.id
    );
    Ok(seed)
}
