//! Destructive schema reset used by database initialization.

use super::migrations::apply_pending;
use super::DbResult;
use log::{info, warn};
use rusqlite::Connection;

/// Drops every user-defined table and view, then re-applies all migrations.
///
/// Works on any prior schema, including foreign tables and versions newer
/// than this binary knows.
///
/// # Invariants
/// - Internal `sqlite_*` objects are left alone.
/// - Nothing is committed here; run it on a `Transaction` (for example inside
///   `Session::run`) so the drop, the re-create and any follow-up writes land
///   together or not at all.
/// - On success the schema is at `latest_version()` with empty tables.
pub fn reset_schema(conn: &Connection) -> DbResult<()> {
    let objects = {
        // Views go first so they never outlive the tables they select from.
        let mut stmt = conn.prepare(
            "SELECT type, name
             FROM sqlite_master
             WHERE type IN ('table', 'view')
               AND name NOT LIKE 'sqlite_%'
             ORDER BY type = 'table', name;",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    for (kind, name) in &objects {
        let keyword = if kind == "view" { "VIEW" } else { "TABLE" };
        conn.execute_batch(&format!(
            "DROP {keyword} IF EXISTS {};",
            quote_identifier(name)
        ))?;
    }
    conn.execute_batch("PRAGMA user_version = 0;")?;
    warn!(
        "event=db_reset module=db status=dropped object_count={}",
        objects.len()
    );

    apply_pending(conn)?;
    info!("event=db_reset module=db status=ok");
    Ok(())
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
