//! Core persistence and use-case logic for the userbase admin tool.
//! This crate owns the schema, the scoped session and every user invariant.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::password::{hash_password, verify_password, PasswordError};
pub use db::{DbError, DbResult, Session};
pub use logging::{default_log_level, init_logging};
pub use model::user::{NewUser, User, UserId};
pub use repo::user_repo::{
    RepoError, RepoResult, SqliteUserRepository, UserListQuery, UserRepository,
    DEFAULT_PAGE_LIMIT,
};
pub use service::bootstrap_service::{
    initialize_database, SEED_EMAIL, SEED_PASSWORD, SEED_USERNAME,
};
pub use service::user_service::UserService;
