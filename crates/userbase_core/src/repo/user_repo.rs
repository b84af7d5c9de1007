//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and lookup APIs over the `users` table.
//! - Translate uniqueness violations into `RepoError::Conflict`.
//!
//! # Invariants
//! - Listing order is insertion order (`id ASC`).
//! - Substring search is case-sensitive and treats `%`/`_` literally.
//! - Mutations that touch zero rows report `NotFound`.

use crate::auth::password::PasswordError;
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::user::{NewUser, User, UserId};
use rusqlite::{ffi, params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    password_hash
FROM users";

const USER_COLUMNS: [&str; 4] = ["id", "username", "email", "password_hash"];

/// Default page size for `UserListQuery`.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Password(PasswordError),
    /// No row matched the given key (username or id).
    NotFound(String),
    /// A write would violate a uniqueness constraint.
    Conflict(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Password(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "user not found: {key}"),
            Self::Conflict(message) => write!(f, "uniqueness conflict: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Password(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<PasswordError> for RepoError {
    fn from(value: PasswordError) -> Self {
        Self::Password(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination options for listing users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserListQuery {
    pub limit: u32,
    pub offset: u32,
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn search_users(&self, query: &str) -> RepoResult<Vec<User>>;
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    fn update_email(&self, id: UserId, email: &str) -> RepoResult<()>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
///
/// Accepts any `&Connection`, including a `Transaction` through deref, so
/// callers decide the transaction scope.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when `users` is
    ///   absent or incomplete.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        self.conn
            .execute(
                "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3);",
                params![
                    user.username.as_str(),
                    user.email.as_str(),
                    user.password_hash.as_str(),
                ],
            )
            .map_err(map_write_error)?;

        Ok(user.clone().into_user(self.conn.last_insert_rowid()))
    }

    fn get_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;

        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn search_users(&self, query: &str) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE instr(username, ?1) > 0
                OR instr(email, ?1) > 0
             ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query([query])?;
        collect_users(&mut rows)
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
        ))?;

        let mut rows = stmt.query(params![i64::from(query.limit), i64::from(query.offset)])?;
        collect_users(&mut rows)
    }

    fn update_email(&self, id: UserId, email: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE users SET email = ?1 WHERE id = ?2;",
                params![email, id],
            )
            .map_err(map_write_error)?;

        if changed == 0 {
            return Err(RepoError::NotFound(format!("id={id}")));
        }

        Ok(())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(format!("id={id}")));
        }

        Ok(())
    }
}

fn collect_users(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<User>> {
    let mut users = Vec::new();
    while let Some(row) = rows.next()? {
        users.push(parse_user_row(row)?);
    }
    Ok(users)
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id: UserId = row.get("id")?;
    let password_hash: String = row.get("password_hash")?;
    if !password_hash.starts_with('$') {
        return Err(RepoError::InvalidData(format!(
            "users.password_hash for id={id} is not a PHC hash string"
        )));
    }

    Ok(User {
        id,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash,
    })
}

fn map_write_error(err: rusqlite::Error) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::Conflict(message.clone().unwrap_or_else(|| failure.to_string()))
        }
        _ => err.into(),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "users")? {
        return Err(RepoError::MissingRequiredTable("users"));
    }

    for column in USER_COLUMNS {
        if !table_has_column(conn, "users", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "users",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
