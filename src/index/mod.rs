//! Vector index contract consumed by the knowledge store.
//!
//! The index stores one row per entry (payload plus embedding) keyed by `id`,
//! supports exact-match queries by [`Filter`], cosine nearest-neighbour search,
//! upsert, delete-by-filter, and an explicit [`VectorIndex::flush`]. Inserts are
//! only guaranteed visible to `query`, `search` and `count` after a flush.

pub mod sqlite;

pub use sqlite::SqliteVecIndex;

use anyhow::Result;

/// Row selection for [`VectorIndex::query`] and [`VectorIndex::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Match-all predicate, used for listing.
    All,
    /// Primary-key equality.
    Id(String),
    Category(String),
}

impl Filter {
    /// SQL predicate with at most one positional `?` parameter.
    pub(crate) fn to_sql(&self) -> (&'static str, Option<&str>) {
        match self {
            Self::All => ("1 = 1", None),
            Self::Id(id) => ("id = ?", Some(id.as_str())),
            Self::Category(category) => ("category = ?", Some(category.as_str())),
        }
    }

    pub fn matches(&self, row: &IndexRow) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => &row.id == id,
            Self::Category(category) => &row.category == category,
        }
    }
}

/// Payload columns of a stored entry. `tags` is the encoded tag string.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub id: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub created_at: i64,
}

/// A row to upsert, with its embedding.
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub row: IndexRow,
    pub embedding: Vec<f32>,
}

/// A search hit. `score` is cosine similarity, higher is closer.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub row: IndexRow,
    pub score: f32,
}

pub trait VectorIndex: Send + Sync {
    /// Collection name.
    fn name(&self) -> &str;

    /// Vector width every record and query must have.
    fn dimensions(&self) -> usize;

    /// Exact-match lookup of committed rows.
    fn query(&self, filter: &Filter, limit: usize, offset: usize) -> Result<Vec<IndexRow>>;

    /// Up to `limit` committed rows ordered by descending cosine similarity.
    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredRow>>;

    /// Stage records for upsert by `id`. Not visible until [`VectorIndex::flush`].
    fn insert(&self, records: Vec<IndexRecord>) -> Result<()>;

    /// Remove every committed or staged row matching `filter`. Returns the
    /// number of committed rows removed.
    fn delete(&self, filter: &Filter) -> Result<usize>;

    /// Commit staged inserts. On failure the records stay staged.
    fn flush(&self) -> Result<()>;

    /// Number of committed rows matching `filter`.
    fn count_matching(&self, filter: &Filter) -> Result<u64>;

    /// Number of committed rows.
    fn count(&self) -> Result<u64> {
        self.count_matching(&Filter::All)
    }
}
