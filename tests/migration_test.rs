use lorebook::db;
use lorebook::db::migrations::{
    get_embedding_model, get_schema_version, run_migrations, set_embedding_model,
    CURRENT_SCHEMA_VERSION,
};
use lorebook::index::{Filter, SqliteVecIndex, VectorIndex};
use lorebook::knowledge::tags;
use tempfile::TempDir;

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = db::open_memory_database(8).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migrations_are_idempotent() {
    let conn = db::open_memory_database(8).unwrap();
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn embedding_model_is_recorded() {
    let conn = db::open_memory_database(8).unwrap();
    assert!(get_embedding_model(&conn).unwrap().is_none());

    set_embedding_model(&conn, "paraphrase-multilingual-MiniLM-L12-v2").unwrap();
    assert_eq!(
        get_embedding_model(&conn).unwrap().as_deref(),
        Some("paraphrase-multilingual-MiniLM-L12-v2")
    );
}

#[test]
fn v1_database_on_disk_is_upgraded_on_open() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("knowledge.db");

    // build a v1 database by hand
    {
        db::load_sqlite_vec();
        let conn = rusqlite::Connection::open(&path).unwrap();
        db::schema::init_schema(&conn, 8).unwrap();
        conn.execute(
            "INSERT INTO knowledge (id, content, category, tags, created_at) \
             VALUES ('legacy', 'old row', 'general', 'x,y,z', 1)",
            [],
        )
        .unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
    }

    let index = SqliteVecIndex::open(&path, "legacy", 8).unwrap();
    let rows = index.query(&Filter::Id("legacy".into()), 1, 0).unwrap();
    assert_eq!(tags::decode(&rows[0].tags).unwrap(), vec!["x", "y", "z"]);
}

#[test]
fn legacy_join_splits_tags_containing_commas() {
    let original = vec!["a".to_string(), "b".to_string(), "c,d".to_string()];
    let joined = original.join(",");
    let recovered = tags::split_legacy(&joined);

    assert_ne!(recovered, original);
    assert_eq!(recovered, vec!["a", "b", "c", "d"]);
}
