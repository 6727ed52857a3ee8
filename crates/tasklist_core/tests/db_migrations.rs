use rusqlite::Connection;
use tasklist_core::db::migrations::latest_version;
use tasklist_core::db::{open_db, open_db_in_memory, DbError, NOW_EPOCH_MS_SQL};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "tasks");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasklist.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "tasks");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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
fn foreign_keys_are_enforced_on_opened_connections() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let orphan = conn.execute("INSERT INTO tasks (user_id, title) VALUES (77, 'orphan');", []);
    assert!(orphan.is_err(), "task without an owner row must be rejected");
}

#[test]
fn email_column_is_unique() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (email, password_hash) VALUES ('a@x.com', 'h');",
        [],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO users (email, password_hash) VALUES ('a@x.com', 'h2');",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn timestamp_defaults_use_shared_epoch_ms_expression() {
    let conn = open_db_in_memory().unwrap();
    let default_clause = format!("DEFAULT ({NOW_EPOCH_MS_SQL})");

    for table in ["users", "tasks"] {
        let create_sql: String = conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1;",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(
            create_sql.matches(&default_clause).count(),
            2,
            "{table} created_at/updated_at defaults drifted from NOW_EPOCH_MS_SQL"
        );
    }
}

#[test]
fn default_timestamps_fall_within_epoch_ms_clock() {
    let conn = open_db_in_memory().unwrap();
    let now_sql = format!("SELECT {NOW_EPOCH_MS_SQL};");
    let before: i64 = conn.query_row(&now_sql, [], |row| row.get(0)).unwrap();

    let (created_at, updated_at): (i64, i64) = conn
        .query_row(
            "INSERT INTO users (email, password_hash) VALUES ('t@x.com', 'h')
             RETURNING created_at, updated_at;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    let after: i64 = conn.query_row(&now_sql, [], |row| row.get(0)).unwrap();

    assert!(before <= created_at && created_at <= after);
    assert_eq!(created_at, updated_at);
    assert!(before > 1_600_000_000_000, "clock must be in milliseconds");
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
