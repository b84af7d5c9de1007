//! Scoped database session.
//!
//! # Responsibility
//! - Own one bootstrapped connection for the duration of a command.
//! - Run work inside a transaction that is committed on success and rolled
//!   back on failure.
//!
//! # Invariants
//! - A transaction never outlives a single `Session::run` call.
//! - The connection is released when the session is dropped, on every path.

use super::{open_db, open_db_for_reset, open_db_in_memory, DbError, DbResult};
use log::{debug, error, info, warn};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Instant;

/// A bootstrapped connection plus the transaction scope commands run in.
#[derive(Debug)]
pub struct Session {
    conn: Connection,
    mode: &'static str,
}

impl Session {
    /// Opens a session over a database file, creating and migrating it when
    /// needed.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let conn = open_db(path)?;
        debug!("event=session_open module=db status=ok mode=file");
        Ok(Self { conn, mode: "file" })
    }

    /// Opens a session over a database file whose schema is about to be
    /// replaced; no migration is attempted.
    ///
    /// The only valid first step on this session is a `run` that calls
    /// `reset_schema`.
    pub fn open_for_reset(path: impl AsRef<Path>) -> DbResult<Self> {
        let conn = open_db_for_reset(path)?;
        debug!("event=session_open module=db status=ok mode=file_reset");
        Ok(Self {
            conn,
            mode: "file_reset",
        })
    }

    /// Opens a session over a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        debug!("event=session_open module=db status=ok mode=memory");
        Ok(Self {
            conn,
            mode: "memory",
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `work` inside one transaction.
    ///
    /// # Contract
    /// - `Ok` from `work` commits; a failed commit is returned as `DbError`.
    /// - `Err` from `work` rolls back explicitly and is returned unchanged.
    /// - A failed rollback is logged; the original error still wins.
    pub fn run<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        let started_at = Instant::now();
        let tx = self.conn.transaction().map_err(DbError::from)?;

        match work(&tx) {
            Ok(value) => {
                tx.commit().map_err(DbError::from)?;
                info!(
                    "event=session_commit module=db status=ok mode={} duration_ms={}",
                    self.mode,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                match tx.rollback() {
                    Ok(()) => warn!(
                        "event=session_rollback module=db status=ok mode={} duration_ms={}",
                        self.mode,
                        started_at.elapsed().as_millis()
                    ),
                    Err(rollback_err) => error!(
                        "event=session_rollback module=db status=error mode={} error={}",
                        self.mode, rollback_err
                    ),
                }
                Err(err)
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("event=session_close module=db status=ok mode={}", self.mode);
    }
}
