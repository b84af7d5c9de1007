use rusqlite::Connection;
use userbase_core::db::migrations::latest_version;
use userbase_core::db::{open_db, open_db_for_reset, open_db_in_memory, reset_schema, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("userbase.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO users (username, email, password_hash) VALUES ('a', 'a@x', '$h');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unique_constraints_are_part_of_the_schema() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES ('a', 'a@x', '$h');",
        [],
    )
    .unwrap();

    let same_username = conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES ('a', 'b@x', '$h');",
        [],
    );
    let same_email = conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES ('b', 'a@x', '$h');",
        [],
    );

    assert!(same_username.is_err());
    assert!(same_email.is_err());
}

#[test]
fn reset_schema_on_file_database_empties_users() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reset.sqlite3");

    let mut conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES ('a', 'a@x', '$h');",
        [],
    )
    .unwrap();
    let tx = conn.transaction().unwrap();
    reset_schema(&tx).unwrap();
    tx.commit().unwrap();
    drop(conn);

    let reopened = open_db(&path).unwrap();
    let count: i64 = reopened
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(schema_version(&reopened), latest_version());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

#[test]
fn open_for_reset_accepts_schemas_that_open_db_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("legacy.sqlite3");
    let future = dir.path().join("future.sqlite3");

    let conn = Connection::open(&legacy).unwrap();
    conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, username TEXT);")
        .unwrap();
    drop(conn);
    let conn = Connection::open(&future).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    assert!(open_db(&legacy).is_err());
    assert!(open_db(&future).is_err());

    let legacy_conn = open_db_for_reset(&legacy).unwrap();
    assert_eq!(schema_version(&legacy_conn), 0);
    let future_conn = open_db_for_reset(&future).unwrap();
    assert_eq!(schema_version(&future_conn), 999);
}
