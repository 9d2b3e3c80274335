use bccdata_core::db::{open_db, open_db_in_memory, open_db_with_config};
use bccdata_core::{ContextConfig, DatabaseContext};
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn in_memory_connection_enables_foreign_keys_by_default() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(foreign_keys(&conn), 1);
}

#[test]
fn config_can_disable_foreign_keys() {
    let dir = tempfile::tempdir().unwrap();
    let config = ContextConfig {
        foreign_keys: false,
        busy_timeout: Duration::from_millis(250),
    };

    let conn = open_db_with_config(dir.path().join("plain.db"), &config).unwrap();
    assert_eq!(foreign_keys(&conn), 0);
}

#[test]
fn default_config_waits_five_seconds_on_busy_database() {
    let config = ContextConfig::default();
    assert!(config.foreign_keys);
    assert_eq!(config.busy_timeout, Duration::from_secs(5));
}

#[test]
fn opening_same_file_twice_sees_previous_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bccdata.db");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("CREATE TABLE lists (id INTEGER PRIMARY KEY, name TEXT);")
        .unwrap();
    drop(conn);

    let context = DatabaseContext::open(&path).unwrap();
    let exists: i64 = context
        .connection()
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'lists');",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1);
    assert!(context.is_empty());
}

#[test]
fn opening_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("bccdata.db");

    assert!(open_db(path).is_err());
}

fn foreign_keys(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap()
}
