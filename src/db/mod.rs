//! SQLite storage backing the vector index adapter.
//!
//! Opens the database with the sqlite-vec extension registered, applies the
//! schema and forward-only migrations, and reports health for `lorebook doctor`.

pub mod migrations;
pub mod schema;

use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use sqlite_vec::sqlite3_vec_init;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;

static SQLITE_VEC_INIT: Once = Once::new();

/// Register the sqlite-vec extension globally. Safe to call multiple times.
pub fn load_sqlite_vec() {
    SQLITE_VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Open (or create) the knowledge database at the given path with a vector
/// table of `dimensions` columns.
///
/// Fails if the database was created for a different embedding dimension.
pub fn open_database(path: impl AsRef<Path>, dimensions: usize) -> Result<Connection> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    load_sqlite_vec();

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(Duration::from_millis(5000))?;

    prepare(&conn, dimensions)?;

    tracing::info!(path = %path.display(), dimensions, "database initialized");
    Ok(conn)
}

/// Open an in-memory database with schema and migrations applied.
pub fn open_memory_database(dimensions: usize) -> Result<Connection> {
    load_sqlite_vec();
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    prepare(&conn, dimensions)?;
    Ok(conn)
}

fn prepare(conn: &Connection, dimensions: usize) -> Result<()> {
    schema::init_schema(conn, dimensions).context("failed to initialize schema")?;
    migrations::run_migrations(conn).context("failed to run migrations")?;

    let stored = schema::get_embedding_dim(conn)?;
    if stored != Some(dimensions) {
        bail!(
            "database vectors have {} dimensions but the embedding provider produces {dimensions}",
            stored.map_or_else(|| "unknown".to_string(), |d| d.to_string())
        );
    }
    Ok(())
}

/// Result of [`check_database_health`].
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub integrity_ok: bool,
    pub integrity_details: String,
    pub schema_version: u32,
    pub sqlite_vec_version: String,
    pub embedding_model: Option<String>,
    pub embedding_dim: Option<usize>,
    pub entry_count: u64,
    pub vector_count: u64,
}

/// Run `PRAGMA integrity_check` and collect versions and row counts.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    let sqlite_vec_version: String = conn.query_row("SELECT vec_version()", [], |r| r.get(0))?;
    let entry_count: i64 = conn.query_row("SELECT COUNT(*) FROM knowledge", [], |r| r.get(0))?;
    let vector_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM knowledge_vec", [], |r| r.get(0))?;

    Ok(HealthReport {
        integrity_ok: integrity_details == "ok",
        integrity_details,
        schema_version: migrations::get_schema_version(conn)?,
        sqlite_vec_version,
        embedding_model: migrations::get_embedding_model(conn)?,
        embedding_dim: schema::get_embedding_dim(conn)?,
        entry_count: entry_count as u64,
        vector_count: vector_count as u64,
    })
}
