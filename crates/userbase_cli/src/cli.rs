//! Command-line surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use userbase_core::{default_log_level, DEFAULT_PAGE_LIMIT};

pub const DEFAULT_DB_FILE: &str = "userbase.sqlite3";

/// Administer user records stored in a SQLite database.
#[derive(Debug, Parser)]
#[command(name = "userbase", version)]
pub struct Cli {
    /// Database file; created and migrated on first use.
    #[arg(long, global = true, env = "USERBASE_DB_PATH", default_value = DEFAULT_DB_FILE)]
    pub db: PathBuf,

    /// Print users as JSON lines.
    #[arg(long, global = true)]
    pub json: bool,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "USERBASE_LOG_LEVEL", default_value = default_log_level())]
    pub log_level: String,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true, env = "USERBASE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Drop and recreate the schema, then insert the seed user (destructive).
    Initialize,
    /// Find users by partial username or email.
    GetUser {
        /// Partial username or email to search for.
        query: String,
    },
    /// List users one page at a time.
    GetAllUsers {
        /// Number of users to return.
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
        /// Number of users to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Change the email address of an existing user.
    ChangeEmail {
        /// Username of the user to update.
        username: String,
        /// New email address for the user.
        new_email: String,
    },
    /// Create a new user.
    CreateUser {
        /// Username for the new user.
        username: String,
        /// Email for the new user.
        email: String,
        /// Password for the new user; stored hashed.
        password: String,
    },
    /// Delete a user by username.
    DeleteUser {
        /// Username of the user to delete.
        username: String,
    },
}

impl Command {
    /// Stable name for log events. Never includes arguments.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::GetUser { .. } => "get_user",
            Self::GetAllUsers { .. } => "get_all_users",
            Self::ChangeEmail { .. } => "change_email",
            Self::CreateUser { .. } => "create_user",
            Self::DeleteUser { .. } => "delete_user",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, DEFAULT_DB_FILE};
    use clap::{CommandFactory, Parser};
    use std::path::Path;

    #[test]
    fn clap_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn get_all_users_defaults_to_first_page_of_ten() {
        let cli = Cli::try_parse_from(["userbase", "get-all-users"]).unwrap();
        assert_eq!(
            cli.command,
            Command::GetAllUsers {
                limit: 10,
                offset: 0
            }
        );
    }

    #[test]
    fn global_options_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "userbase",
            "get-user",
            "bo",
            "--db",
            "/tmp/other.sqlite3",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.db, Path::new("/tmp/other.sqlite3"));
        assert!(cli.json);
        assert_eq!(
            cli.command,
            Command::GetUser {
                query: "bo".to_string()
            }
        );
    }

    #[test]
    fn create_user_requires_all_three_arguments() {
        assert!(Cli::try_parse_from(["userbase", "create-user", "alice", "a@mail.com"]).is_err());
    }

    #[test]
    fn negative_offset_is_rejected() {
        assert!(Cli::try_parse_from(["userbase", "get-all-users", "--offset", "-1"]).is_err());
    }

    #[test]
    fn db_defaults_to_local_file() {
        if std::env::var_os("USERBASE_DB_PATH").is_some() {
            return;
        }
        let cli = Cli::try_parse_from(["userbase", "initialize"]).unwrap();
        assert_eq!(cli.db, Path::new(DEFAULT_DB_FILE));
    }
}
