//! One handler per subcommand.
//!
//! # Responsibility
//! - Run exactly one use case inside the caller's session.
//! - Turn not-found and uniqueness conflicts into user-facing messages.
//!
//! # Invariants
//! - Every handler runs its storage work through `Session::run`, so a
//!   failed handler leaves no partial writes.
//! - Errors other than not-found and conflict propagate to `main`.

use crate::cli::Command;
use crate::output::Printer;
use anyhow::Result;
use log::info;
use std::io::Write;
use userbase_core::{
    initialize_database, RepoError, RepoResult, Session, SqliteUserRepository, User,
    UserListQuery, UserService,
};

const CONFLICT_MESSAGE: &str = "Username or email already taken!";

/// Runs `command` against `session`, printing results to `printer`.
pub fn dispatch<W: Write>(
    command: Command,
    session: &mut Session,
    printer: &mut Printer<W>,
) -> Result<()> {
    info!(
        "event=command_start module=cli status=start command={}",
        command.name()
    );

    match command {
        Command::Initialize => initialize(session, printer),
        Command::GetUser { query } => get_user(session, printer, &query),
        Command::GetAllUsers { limit, offset } => {
            get_all_users(session, printer, UserListQuery { limit, offset })
        }
        Command::ChangeEmail {
            username,
            new_email,
        } => change_email(session, printer, &username, &new_email),
        Command::CreateUser {
            username,
            email,
            password,
        } => create_user(session, printer, &username, &email, &password),
        Command::DeleteUser { username } => delete_user(session, printer, &username),
    }
}

fn initialize<W: Write>(session: &mut Session, printer: &mut Printer<W>) -> Result<()> {
    initialize_database(session)?;
    printer.message("Database Initialized")
}

fn get_user<W: Write>(session: &mut Session, printer: &mut Printer<W>, query: &str) -> Result<()> {
    let users = with_service(session, |service| service.find_users(query))?;
    if users.is_empty() {
        return printer.message(format!("No users found matching \"{query}\""));
    }
    print_users(printer, &users)
}

fn get_all_users<W: Write>(
    session: &mut Session,
    printer: &mut Printer<W>,
    page: UserListQuery,
) -> Result<()> {
    let users = with_service(session, |service| service.list_users(&page))?;
    if users.is_empty() {
        return printer.message("No users found");
    }
    print_users(printer, &users)
}

fn change_email<W: Write>(
    session: &mut Session,
    printer: &mut Printer<W>,
    username: &str,
    new_email: &str,
) -> Result<()> {
    match with_service(session, |service| service.change_email(username, new_email)) {
        Ok(user) => printer.message(format!(
            "Updated {}'s email to {}",
            user.username, user.email
        )),
        Err(RepoError::NotFound(_)) => {
            printer.message(format!("{username} not found! Unable to update email."))
        }
        Err(RepoError::Conflict(_)) => printer.message(CONFLICT_MESSAGE),
        Err(err) => Err(err.into()),
    }
}

fn create_user<W: Write>(
    session: &mut Session,
    printer: &mut Printer<W>,
    username: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    match with_service(session, |service| {
        service.create_user(username, email, password)
    }) {
        Ok(user) => printer.user(&user),
        Err(RepoError::Conflict(_)) => printer.message(CONFLICT_MESSAGE),
        Err(err) => Err(err.into()),
    }
}

fn delete_user<W: Write>(
    session: &mut Session,
    printer: &mut Printer<W>,
    username: &str,
) -> Result<()> {
    match with_service(session, |service| service.delete_user(username)) {
        Ok(_) => printer.message(format!("{username} deleted")),
        Err(RepoError::NotFound(_)) => {
            printer.message(format!("{username} not found! Unable to delete user."))
        }
        Err(err) => Err(err.into()),
    }
}

fn print_users<W: Write>(printer: &mut Printer<W>, users: &[User]) -> Result<()> {
    for user in users {
        printer.user(user)?;
    }
    Ok(())
}

fn with_service<T>(
    session: &mut Session,
    work: impl FnOnce(&UserService<SqliteUserRepository<'_>>) -> RepoResult<T>,
) -> RepoResult<T> {
    session.run(|tx| -> RepoResult<T> {
        let service = UserService::new(SqliteUserRepository::try_new(tx)?);
        work(&service)
    })
}
