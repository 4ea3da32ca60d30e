//! [`VectorIndex`] adapter over SQLite + sqlite-vec.
//!
//! Payload lives in `knowledge`, embeddings in the `knowledge_vec` vec0 table
//! (cosine distance). Inserts are buffered in memory and written in a single
//! transaction by [`VectorIndex::flush`]; until then they are invisible to
//! reads. A failed flush leaves the batch buffered. Deletes apply immediately
//! and also drop matching buffered records.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, ensure, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

use super::{Filter, IndexRecord, IndexRow, ScoredRow, VectorIndex};

pub struct SqliteVecIndex {
    conn: Mutex<Connection>,
    pending: Mutex<Vec<IndexRecord>>,
    collection: String,
    dimensions: usize,
}

impl SqliteVecIndex {
    /// Wrap a connection that already has the knowledge schema for `dimensions`.
    pub fn new(conn: Connection, collection: impl Into<String>, dimensions: usize) -> Self {
        Self {
            conn: Mutex::new(conn),
            pending: Mutex::new(Vec::new()),
            collection: collection.into(),
            dimensions,
        }
    }

    /// Open (or create) an on-disk index.
    pub fn open(
        path: impl AsRef<Path>,
        collection: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self> {
        let conn = crate::db::open_database(path, dimensions)?;
        Ok(Self::new(conn, collection, dimensions))
    }

    /// Open a throwaway in-memory index.
    pub fn open_in_memory(collection: impl Into<String>, dimensions: usize) -> Result<Self> {
        let conn = crate::db::open_memory_database(dimensions)?;
        Ok(Self::new(conn, collection, dimensions))
    }

    /// Number of records waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow!("index connection lock poisoned: {e}"))
    }

    fn lock_pending(&self) -> Result<MutexGuard<'_, Vec<IndexRecord>>> {
        self.pending
            .lock()
            .map_err(|e| anyhow!("index write buffer lock poisoned: {e}"))
    }
}

impl VectorIndex for SqliteVecIndex {
    fn name(&self) -> &str {
        &self.collection
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn query(&self, filter: &Filter, limit: usize, offset: usize) -> Result<Vec<IndexRow>> {
        let (predicate, value) = filter.to_sql();
        let sql = format!(
            "SELECT id, content, category, tags, created_at FROM knowledge \
             WHERE {predicate} ORDER BY rowid LIMIT ? OFFSET ?"
        );

        let mut values: Vec<Value> = value.map(|v| Value::Text(v.to_string())).into_iter().collect();
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredRow>> {
        ensure!(
            vector.len() == self.dimensions,
            "query vector has {} dimensions, index expects {}",
            vector.len(),
            self.dimensions
        );
        if limit == 0 {
            return Ok(Vec::new());
        }

        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, distance FROM knowledge_vec \
             WHERE embedding MATCH ?1 ORDER BY distance LIMIT ?2",
        )?;
        let hits: Vec<(String, f64)> = stmt
            .query_map(params![embedding_to_bytes(vector), limit as i64], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
        let mut rows = fetch_rows(&conn, &ids)?;

        // cosine distance = 1 - cosine similarity
        Ok(hits
            .into_iter()
            .filter_map(|(id, distance)| {
                rows.remove(&id).map(|row| ScoredRow {
                    row,
                    score: (1.0 - distance) as f32,
                })
            })
            .collect())
    }

    fn insert(&self, records: Vec<IndexRecord>) -> Result<()> {
        for record in &records {
            ensure!(
                record.embedding.len() == self.dimensions,
                "record {} has {} dimensions, index expects {}",
                record.row.id,
                record.embedding.len(),
                self.dimensions
            );
        }
        self.lock_pending()?.extend(records);
        Ok(())
    }

    fn delete(&self, filter: &Filter) -> Result<usize> {
        let (predicate, value) = filter.to_sql();

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let ids: Vec<String> = tx
            .prepare(&format!("SELECT id FROM knowledge WHERE {predicate}"))?
            .query_map(params_from_iter(value.iter()), |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        {
            let mut stmt = tx.prepare("DELETE FROM knowledge_vec WHERE id = ?1")?;
            for id in &ids {
                stmt.execute(params![id])?;
            }
        }
        let removed = tx.execute(
            &format!("DELETE FROM knowledge WHERE {predicate}"),
            params_from_iter(value.iter()),
        )?;
        tx.commit()?;

        // Pruned under the connection lock so no flush can hold matching records.
        self.lock_pending()?
            .retain(|record| !filter.matches(&record.row));
        drop(conn);

        tracing::debug!(?filter, removed, "index rows deleted");
        Ok(removed)
    }

    fn flush(&self) -> Result<()> {
        // Lock order is conn then pending. Holding conn until commit means a
        // concurrent flush that finds the buffer empty only returns after
        // these records are durable.
        let mut conn = self.lock_conn()?;
        let records = std::mem::take(&mut *self.lock_pending()?);
        if records.is_empty() {
            return Ok(());
        }

        if let Err(e) = commit_records(&mut conn, &records) {
            // Put the batch back ahead of anything staged since.
            let mut pending = self.lock_pending()?;
            let newer = std::mem::replace(&mut *pending, records);
            pending.extend(newer);
            return Err(e);
        }

        tracing::debug!(records = records.len(), "index flushed");
        Ok(())
    }

    fn count_matching(&self, filter: &Filter) -> Result<u64> {
        let (predicate, value) = filter.to_sql();
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM knowledge WHERE {predicate}"),
            params_from_iter(value.iter()),
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Upsert `records` into both tables in one transaction.
fn commit_records(conn: &mut Connection, records: &[IndexRecord]) -> Result<()> {
    let tx = conn.transaction()?;
    {
        let mut upsert_row = tx.prepare(
            "INSERT INTO knowledge (id, content, category, tags, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(id) DO UPDATE SET content = excluded.content, \
             category = excluded.category, tags = excluded.tags, \
             created_at = excluded.created_at",
        )?;
        let mut delete_vec = tx.prepare("DELETE FROM knowledge_vec WHERE id = ?1")?;
        let mut insert_vec =
            tx.prepare("INSERT INTO knowledge_vec (id, embedding) VALUES (?1, ?2)")?;

        for IndexRecord { row, embedding } in records {
            upsert_row.execute(params![
                row.id,
                row.content,
                row.category,
                row.tags,
                row.created_at
            ])?;
            // vec0 has no upsert
            delete_vec.execute(params![row.id])?;
            insert_vec.execute(params![row.id, embedding_to_bytes(embedding)])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<IndexRow> {
    Ok(IndexRow {
        id: row.get(0)?,
        content: row.get(1)?,
        category: row.get(2)?,
        tags: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Batch-fetch payload rows by id.
fn fetch_rows(conn: &Connection, ids: &[&str]) -> Result<HashMap<String, IndexRow>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT id, content, category, tags, created_at FROM knowledge WHERE id IN ({})",
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), read_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().map(|row| (row.id.clone(), row)).collect())
}

/// View an f32 slice as raw bytes for sqlite-vec.
fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            std::mem::size_of_val(embedding),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIM: usize = 8;

    fn index() -> SqliteVecIndex {
        SqliteVecIndex::open_in_memory("test", DIM).unwrap()
    }

    /// Unit vector along `axis`.
    fn axis(axis: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; DIM];
        v[axis] = 1.0;
        v
    }

    fn record(id: &str, category: &str, embedding: Vec<f32>) -> IndexRecord {
        IndexRecord {
            row: IndexRow {
                id: id.into(),
                content: format!("content of {id}"),
                category: category.into(),
                tags: "[]".into(),
                created_at: 1_700_000_000_000,
            },
            embedding,
        }
    }

    #[test]
    fn inserts_are_invisible_until_flush() {
        let index = index();
        index.insert(vec![record("a", "general", axis(0))]).unwrap();

        assert_eq!(index.pending_len(), 1);
        assert!(index.query(&Filter::Id("a".into()), 1, 0).unwrap().is_empty());
        assert!(index.search(&axis(0), 5).unwrap().is_empty());
        assert_eq!(index.count().unwrap(), 0);

        index.flush().unwrap();

        assert_eq!(index.pending_len(), 0);
        assert_eq!(index.query(&Filter::Id("a".into()), 1, 0).unwrap().len(), 1);
        assert_eq!(index.count().unwrap(), 1);
    }

    #[test]
    fn flush_does_not_return_before_staged_records_commit() {
        let index = std::sync::Arc::new(index());
        index
            .insert(vec![record("a", "general", axis(0)), record("b", "general", axis(1))])
            .unwrap();

        let guard = index.lock_conn().unwrap();
        let flushers: Vec<_> = (0..2)
            .map(|_| {
                let index = std::sync::Arc::clone(&index);
                std::thread::spawn(move || index.flush())
            })
            .collect();

        std::thread::sleep(std::time::Duration::from_millis(50));
        // neither flush can take the batch or report success without the connection
        assert!(flushers.iter().all(|h| !h.is_finished()));
        assert_eq!(index.pending_len(), 2);

        drop(guard);
        for flusher in flushers {
            flusher.join().unwrap().unwrap();
        }
        assert_eq!(index.count().unwrap(), 2);
    }

    #[test]
    fn failed_flush_keeps_records_staged() {
        let index = index();
        index.insert(vec![record("a", "general", axis(0))]).unwrap();
        index
            .lock_conn()
            .unwrap()
            .execute_batch("DROP TABLE knowledge_vec")
            .unwrap();

        assert!(index.flush().is_err());
        assert_eq!(index.pending_len(), 1);

        index.insert(vec![record("b", "general", axis(1))]).unwrap();
        crate::db::schema::init_schema(&index.lock_conn().unwrap(), DIM).unwrap();
        index.flush().unwrap();

        assert_eq!(index.pending_len(), 0);
        assert_eq!(index.count().unwrap(), 2);
        assert_eq!(index.search(&axis(0), 1).unwrap()[0].row.id, "a");
    }

    #[test]
    fn count_matching_applies_filter() {
        let index = index();
        index
            .insert(vec![
                record("a", "rust", axis(0)),
                record("b", "go", axis(1)),
                record("c", "rust", axis(2)),
            ])
            .unwrap();
        index.flush().unwrap();

        assert_eq!(index.count_matching(&Filter::Category("rust".into())).unwrap(), 2);
        assert_eq!(index.count_matching(&Filter::Id("b".into())).unwrap(), 1);
        assert_eq!(index.count().unwrap(), 3);
    }

    #[test]
    fn duplicate_ids_collapse_on_flush() {
        let index = index();
        index.insert(vec![record("same", "general", axis(0))]).unwrap();
        index.insert(vec![record("same", "general", axis(1))]).unwrap();
        index.flush().unwrap();

        assert_eq!(index.count().unwrap(), 1);
        // last write wins for the vector too
        let hits = index.search(&axis(1), 1).unwrap();
        assert_eq!(hits[0].row.id, "same");
        assert!(hits[0].score > 0.99);
    }

    #[test]
    fn search_orders_by_cosine_similarity() {
        let index = index();
        let mut near = axis(0);
        near[1] = 0.5;
        index
            .insert(vec![
                record("exact", "general", axis(0)),
                record("near", "general", near),
                record("far", "general", axis(3)),
            ])
            .unwrap();
        index.flush().unwrap();

        let hits = index.search(&axis(0), 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.row.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "near", "far"]);
        assert!((hits[0].score - 1.0).abs() < 1e-4);
        assert!(hits[2].score.abs() < 1e-4);
    }

    #[test]
    fn search_respects_limit_and_empty_index() {
        let index = index();
        assert!(index.search(&axis(0), 5).unwrap().is_empty());

        index
            .insert((0..4).map(|i| record(&format!("r{i}"), "general", axis(i))).collect())
            .unwrap();
        index.flush().unwrap();
        assert_eq!(index.search(&axis(0), 2).unwrap().len(), 2);
    }

    #[test]
    fn delete_removes_committed_and_pending_rows() {
        let index = index();
        index.insert(vec![record("a", "general", axis(0))]).unwrap();
        index.flush().unwrap();
        index.insert(vec![record("b", "notes", axis(1))]).unwrap();

        assert_eq!(index.delete(&Filter::Id("a".into())).unwrap(), 1);
        assert_eq!(index.delete(&Filter::Category("notes".into())).unwrap(), 0);
        index.flush().unwrap();

        assert_eq!(index.count().unwrap(), 0);
        assert!(index.search(&axis(0), 5).unwrap().is_empty());
    }

    #[test]
    fn delete_of_missing_id_is_not_an_error() {
        let index = index();
        assert_eq!(index.delete(&Filter::Id("missing".into())).unwrap(), 0);
    }

    #[test]
    fn query_filters_and_pages() {
        let index = index();
        index
            .insert(vec![
                record("a", "rust", axis(0)),
                record("b", "go", axis(1)),
                record("c", "rust", axis(2)),
            ])
            .unwrap();
        index.flush().unwrap();

        let rust = index.query(&Filter::Category("rust".into()), 10, 0).unwrap();
        assert_eq!(rust.len(), 2);
        assert!(rust.iter().all(|r| r.category == "rust"));

        let page = index.query(&Filter::All, 2, 2).unwrap();
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn wrong_dimensions_are_rejected() {
        let index = index();
        assert!(index.insert(vec![record("a", "general", vec![1.0; 3])]).is_err());
        assert!(index.search(&[1.0; 3], 1).is_err());
    }
}
