//! The knowledge store: entry lifecycle and similarity search.
//!
//! [`KnowledgeStore`] owns an embedding provider and a vector index, both
//! injected at construction and never replaced. Every operation is synchronous
//! and may block on the embedder or the index; async callers run it on
//! `spawn_blocking`. No lock is held across the check-then-write steps, so
//! two concurrent writes of the same text can both insert; the index's
//! upsert-by-id collapses them.

pub mod error;
pub mod forget;
pub mod identity;
pub mod search;
pub mod stats;
pub mod store;
pub mod tags;
pub mod types;

use std::sync::Arc;

use anyhow::ensure;

use crate::config::LorebookConfig;
use crate::embedding::EmbeddingProvider;
use crate::index::VectorIndex;

pub use error::{KnowledgeError, Result};
pub use identity::derive_id;
pub use types::{
    DeleteOutcome, KnowledgeEntry, ListRequest, ListResponse, NewEntry, SearchHit,
    SearchRequest, SearchResponse, StatsResponse, UpdateOutcome, WriteOutcome, WriteStatus,
};

/// Input limits and defaults applied by the store.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub default_category: String,
    pub max_content_bytes: usize,
    pub max_category_bytes: usize,
    pub max_tags_bytes: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub default_list_limit: usize,
    pub max_list_limit: usize,
}

impl StoreSettings {
    pub fn from_config(config: &LorebookConfig) -> Self {
        Self {
            default_category: config.entries.default_category.clone(),
            max_content_bytes: config.entries.max_content_bytes,
            max_category_bytes: config.entries.max_category_bytes,
            max_tags_bytes: config.entries.max_tags_bytes,
            default_top_k: config.retrieval.default_top_k,
            max_top_k: config.retrieval.max_top_k,
            default_list_limit: config.retrieval.default_list_limit,
            max_list_limit: config.retrieval.max_list_limit,
        }
    }
}

impl StoreSettings {
    /// Check that the configured defaults lie inside their own bounds.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.max_top_k >= 1, "retrieval.max_top_k must be at least 1");
        ensure!(
            (1..=self.max_top_k).contains(&self.default_top_k),
            "retrieval.default_top_k must be between 1 and max_top_k ({}), got {}",
            self.max_top_k,
            self.default_top_k
        );
        ensure!(self.max_list_limit >= 1, "retrieval.max_list_limit must be at least 1");
        ensure!(
            (1..=self.max_list_limit).contains(&self.default_list_limit),
            "retrieval.default_list_limit must be between 1 and max_list_limit ({}), got {}",
            self.max_list_limit,
            self.default_list_limit
        );
        Ok(())
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::from_config(&LorebookConfig::default())
    }
}

pub struct KnowledgeStore {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    settings: StoreSettings,
}

impl KnowledgeStore {
    /// Fails if the embedder and the index disagree on vector width, or if
    /// `settings` defaults fall outside their limits.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        settings: StoreSettings,
    ) -> anyhow::Result<Self> {
        settings.validate()?;
        ensure!(
            embedder.dimensions() == index.dimensions(),
            "embedding provider produces {} dimensions but index `{}` stores {}",
            embedder.dimensions(),
            index.name(),
            index.dimensions()
        );
        Ok(Self {
            embedder,
            index,
            settings,
        })
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn collection(&self) -> &str {
        self.index.name()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.embedder.embed(text)?;
        if vector.len() != self.index.dimensions() {
            return Err(anyhow::anyhow!(
                "embedder returned {} dimensions, expected {}",
                vector.len(),
                self.index.dimensions()
            )
            .into());
        }
        Ok(vector)
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
