//! Request and response types for knowledge operations.
//!
//! These are shared by the HTTP routes, the MCP tools and the CLI, so their
//! serde shapes are the wire format.

use serde::{Deserialize, Serialize};

/// Input for `write` and `update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    pub content: String,
    /// Falls back to the configured default category when absent or blank.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewEntry {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            category: None,
            tags: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Signed so that zero and negative values reach validation instead of a parse error.
    #[serde(default)]
    pub top_k: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    /// A new entry was inserted.
    Success,
    /// An entry with the same content hash already existed; nothing was written.
    Exists,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub status: WriteStatus,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub id: String,
}

/// Always `"success"`: deleting an unknown id is indistinguishable from a real delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub status: &'static str,
    pub id: String,
}

/// A stored entry as returned to callers. The embedding is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    /// `created_at` in local time, `%Y-%m-%d %H:%M`.
    pub time: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Cosine similarity scaled to 0–100, two decimals.
    pub similarity: f64,
    pub time: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub results: Vec<KnowledgeEntry>,
    /// Entries matching the request's category filter, across all pages.
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub total: u64,
    pub collection: String,
}

/// Rescale a raw similarity to a percentage rounded to two decimals. Display only.
pub fn similarity_percent(score: f32) -> f64 {
    (f64::from(score) * 100.0 * 100.0).round() / 100.0
}

/// Render epoch milliseconds as local `YYYY-MM-DD HH:MM`.
pub fn format_time(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_default()
}
