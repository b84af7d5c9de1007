//! `userbase` command dispatcher.
//!
//! # Responsibility
//! - Parse arguments and resolve configuration.
//! - Acquire one session, run one command, release the session.

mod cli;
mod commands;
mod output;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use log::error;
use output::{OutputFormat, Printer};
use std::io;
use userbase_core::{init_logging, Session};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(&cli.log_level, log_dir)
            .map_err(|message| anyhow!(message))
            .context("failed to initialize logging")?;
    }

    let format = if cli.json {
        OutputFormat::JsonLines
    } else {
        OutputFormat::Text
    };
    let command_name = cli.command.name();

    // Initialization accepts any prior schema; it is replaced, not migrated.
    let opened = match cli.command {
        Command::Initialize => Session::open_for_reset(&cli.db),
        _ => Session::open(&cli.db),
    };
    let mut session = opened
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let mut printer = Printer::new(io::stdout().lock(), format);

    let result = commands::dispatch(cli.command, &mut session, &mut printer);
    if let Err(err) = &result {
        error!(
            "event=command_failed module=cli status=error command={} error={:#}",
            command_name, err
        );
    }
    result
}
