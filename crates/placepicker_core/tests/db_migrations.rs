use placepicker_core::db::migrations::{latest_version, schema_version};
use placepicker_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn in_memory_database_is_fully_migrated() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn reopening_a_database_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("picker.sqlite3");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO kv_entries (key, value) VALUES ('selectedPlaces', '[]');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second).unwrap(), latest_version());
    let value: String = second
        .query_row(
            "SELECT value FROM kv_entries WHERE key = 'selectedPlaces';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(value, "[]");
}

#[test]
fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
