use grants_core::db::migrations::{apply_migrations, current_version, latest_version};
use grants_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_version(&conn).unwrap(), latest_version());
    for table in ["grants", "audit_trail", "attachments", "users"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn reapplying_migrations_is_a_no_op() {
    let mut conn = open_db_in_memory().unwrap();
    assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("grants.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO users (username, password_hash) VALUES ('kept', 'h:s');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_version(&conn_second).unwrap(), latest_version());
    let users: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1);
}

#[test]
fn legacy_schema_without_version_is_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE grants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT, funder TEXT, funding_amount REAL, currency TEXT, theme TEXT,
            status TEXT, deadline TEXT, submitted_date TEXT, description TEXT,
            organization_involved TEXT, key_personnel TEXT, created_at TEXT
        );
        INSERT INTO grants (title, funder, funding_amount, currency, status, created_at)
        VALUES ('Old', 'FAO', 200000.0, 'USD', 'Funded', '2026-01-10T09:30:00.123456');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(current_version(&conn).unwrap(), latest_version());
    let title: String = conn
        .query_row("SELECT title FROM grants WHERE id = 1;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(title, "Old");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

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
