//! SQL DDL for the knowledge tables.
//!
//! `knowledge` holds the payload columns, `knowledge_vec` (vec0) holds the
//! embeddings under the same primary key, and `schema_meta` records the schema
//! version and vector dimension. All DDL uses `IF NOT EXISTS`.

use rusqlite::{Connection, OptionalExtension};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS knowledge (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    category TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_knowledge_category ON knowledge(category);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// vec0 DDL; the dimension is fixed when the table is created.
fn vec_table_sql(dimensions: usize) -> String {
    format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS knowledge_vec USING vec0(\n    \
         id TEXT PRIMARY KEY,\n    \
         embedding FLOAT[{dimensions}] distance_metric=cosine\n);"
    )
}

/// Initialize all schema tables. Idempotent.
///
/// The vector dimension is recorded only the first time; a later call with a
/// different dimension leaves the stored value untouched.
pub fn init_schema(conn: &Connection, dimensions: usize) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(&vec_table_sql(dimensions))?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('embedding_dim', ?1)",
        [dimensions.to_string()],
    )?;

    Ok(())
}

/// Vector dimension the database was created with.
pub fn get_embedding_dim(conn: &Connection) -> rusqlite::Result<Option<usize>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_meta WHERE key = 'embedding_dim'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.and_then(|v| v.parse().ok()))
}
