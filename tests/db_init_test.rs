use lorebook::db;
use lorebook::db::migrations::CURRENT_SCHEMA_VERSION;
use tempfile::TempDir;

#[test]
fn open_creates_new_db_at_nonexistent_path() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("subdir").join("knowledge.db");
    assert!(!db_path.exists());

    let conn = db::open_database(&db_path, 16).unwrap();

    assert!(db_path.exists());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM knowledge", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn health_check_passes_on_fresh_db() {
    let conn = db::open_memory_database(16).unwrap();
    let report = db::check_database_health(&conn).unwrap();

    assert!(report.integrity_ok);
    assert_eq!(report.schema_version, CURRENT_SCHEMA_VERSION);
    assert!(!report.sqlite_vec_version.is_empty());
    assert_eq!(report.embedding_dim, Some(16));
    assert_eq!(report.entry_count, 0);
    assert_eq!(report.vector_count, 0);
}

#[test]
fn reopening_with_another_dimension_fails() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("knowledge.db");

    drop(db::open_database(&db_path, 16).unwrap());
    let err = db::open_database(&db_path, 32).unwrap_err();
    assert!(format!("{err:#}").contains("dimensions"));

    // the recorded dimension still opens
    assert!(db::open_database(&db_path, 16).is_ok());
}

#[test]
fn connection_uses_wal_and_busy_timeout() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open_database(tmp.path().join("knowledge.db"), 16).unwrap();

    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");

    let timeout: i64 = conn
        .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
        .unwrap();
    assert_eq!(timeout, 5000);
}
