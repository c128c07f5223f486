use reelbase_core::db::migrations::{current_version, latest_version};
use reelbase_core::db::{open_db, open_db_in_memory, open_pool, DbError};
use reelbase_core::DbConfig;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "movies");
    assert_table_exists(&conn, "movies_fts");
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "users_fts");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reelbase.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(current_version(&conn_first).unwrap(), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_version(&conn_second).unwrap(), latest_version());
    assert_table_exists(&conn_second, "movies");
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

    let config = DbConfig {
        dsn: path.to_string_lossy().into_owned(),
        max_open_conns: 2,
        max_idle_conns: 1,
        ..DbConfig::default()
    };
    assert!(matches!(
        open_pool(&config),
        Err(DbError::UnsupportedSchemaVersion { db_version: 999, .. })
    ));
}

#[test]
fn schema_enforces_version_floor_and_genre_shape() {
    let conn = open_db_in_memory().unwrap();

    let bad_version = conn.execute(
        "INSERT INTO movies (title, year, runtime, genres, version) VALUES ('x', 2000, 90, '[]', 0);",
        [],
    );
    assert!(bad_version.is_err());

    let bad_genres = conn.execute(
        "INSERT INTO movies (title, year, runtime, genres) VALUES ('x', 2000, 90, 'drama');",
        [],
    );
    assert!(bad_genres.is_err());
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
