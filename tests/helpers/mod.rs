#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use lorebook::embedding::hashing::HashingEmbeddingProvider;
use lorebook::embedding::EmbeddingProvider;
use lorebook::index::{Filter, IndexRecord, IndexRow, ScoredRow, SqliteVecIndex, VectorIndex};
use lorebook::knowledge::{KnowledgeStore, StoreSettings};

/// Vector width used by every test store.
pub const DIM: usize = 64;

/// A store over an in-memory index with the offline hashing embedder.
pub fn test_store() -> KnowledgeStore {
    let index = Arc::new(SqliteVecIndex::open_in_memory("test", DIM).unwrap());
    store_with_index(index)
}

pub fn store_with_index(index: Arc<dyn VectorIndex>) -> KnowledgeStore {
    let embedder = Arc::new(HashingEmbeddingProvider::new(DIM));
    KnowledgeStore::new(embedder, index, StoreSettings::default()).unwrap()
}

/// Index wrapper that records calls and can be told to fail inserts.
pub struct FlakyIndex {
    inner: SqliteVecIndex,
    pub fail_inserts: AtomicBool,
    pub searches: AtomicUsize,
    pub queries: AtomicUsize,
}

impl FlakyIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteVecIndex::open_in_memory("flaky", DIM).unwrap(),
            fail_inserts: AtomicBool::new(false),
            searches: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        })
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst) + self.queries.load(Ordering::SeqCst)
    }
}

impl VectorIndex for FlakyIndex {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn query(&self, filter: &Filter, limit: usize, offset: usize) -> Result<Vec<IndexRow>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(filter, limit, offset)
    }

    fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredRow>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(vector, limit)
    }

    fn insert(&self, records: Vec<IndexRecord>) -> Result<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            bail!("index unavailable");
        }
        self.inner.insert(records)
    }

    fn delete(&self, filter: &Filter) -> Result<usize> {
        self.inner.delete(filter)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn count_matching(&self, filter: &Filter) -> Result<u64> {
        self.inner.count_matching(filter)
    }
}

/// Embedder wrapper that counts calls.
pub struct CountingEmbedder {
    inner: HashingEmbeddingProvider,
    pub calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: HashingEmbeddingProvider::new(DIM),
            calls: AtomicUsize::new(0),
        })
    }
}

impl EmbeddingProvider for CountingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}
