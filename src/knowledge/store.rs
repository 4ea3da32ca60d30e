//! Write path: validation, content-hash dedup, insert, and update.

use super::types::{NewEntry, UpdateOutcome, WriteOutcome, WriteStatus};
use super::{derive_id, now_millis, tags, KnowledgeError, KnowledgeStore, Result};
use crate::index::{Filter, IndexRecord, IndexRow};

/// Validated category and encoded tags for a write.
struct PreparedEntry {
    category: String,
    tags: String,
}

impl KnowledgeStore {
    /// Insert `entry` unless identical content is already stored.
    ///
    /// Returns [`WriteStatus::Exists`] with the existing id and performs no index
    /// mutation when the content hash is already present. Otherwise the row is
    /// inserted and flushed before returning, so it is visible to `exists` and
    /// `search` immediately after.
    pub fn write(&self, entry: &NewEntry) -> Result<WriteOutcome> {
        let prepared = self.prepare_entry(entry)?;
        let embedding = self.embed(&entry.content)?;
        let id = derive_id(&entry.content);

        if self.exists(&id)? {
            tracing::debug!(id = %id, "content already stored");
            return Ok(WriteOutcome {
                status: WriteStatus::Exists,
                id,
            });
        }

        self.index.insert(vec![IndexRecord {
            row: IndexRow {
                id: id.clone(),
                content: entry.content.clone(),
                category: prepared.category,
                tags: prepared.tags,
                created_at: now_millis(),
            },
            embedding,
        }])?;
        self.index.flush()?;

        tracing::info!(id = %id, content_len = entry.content.len(), "knowledge written");
        Ok(WriteOutcome {
            status: WriteStatus::Success,
            id,
        })
    }

    /// Replace the entry stored under `id` with `entry`, keeping the id.
    ///
    /// Implemented as delete then insert: if the insert or flush fails after
    /// the delete, the old entry is gone and nothing replaces it. Prior
    /// existence is not checked, so updating an unknown id creates it. The id
    /// is not re-derived, so afterwards `derive_id(&entry.content) != id`
    /// unless the text is unchanged.
    pub fn update(&self, id: &str, entry: &NewEntry) -> Result<UpdateOutcome> {
        require_id(id)?;
        let prepared = self.prepare_entry(entry)?;
        let embedding = self.embed(&entry.content)?;

        let removed = self.index.delete(&Filter::Id(id.to_string()))?;
        self.index.insert(vec![IndexRecord {
            row: IndexRow {
                id: id.to_string(),
                content: entry.content.clone(),
                category: prepared.category,
                tags: prepared.tags,
                created_at: now_millis(),
            },
            embedding,
        }])?;
        self.index.flush()?;

        tracing::info!(id = %id, replaced = removed, "knowledge updated");
        Ok(UpdateOutcome { id: id.to_string() })
    }

    fn prepare_entry(&self, entry: &NewEntry) -> Result<PreparedEntry> {
        let limits = &self.settings;

        if entry.content.trim().is_empty() {
            return Err(KnowledgeError::validation("content must not be empty"));
        }
        if entry.content.len() > limits.max_content_bytes {
            return Err(KnowledgeError::validation(format!(
                "content is {} bytes, limit is {}",
                entry.content.len(),
                limits.max_content_bytes
            )));
        }

        let category = match entry.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => limits.default_category.clone(),
        };
        if category.len() > limits.max_category_bytes {
            return Err(KnowledgeError::validation(format!(
                "category is {} bytes, limit is {}",
                category.len(),
                limits.max_category_bytes
            )));
        }

        let encoded = tags::encode(&tags::normalize(&entry.tags));
        if encoded.len() > limits.max_tags_bytes {
            return Err(KnowledgeError::validation(format!(
                "tags encode to {} bytes, limit is {}",
                encoded.len(),
                limits.max_tags_bytes
            )));
        }

        Ok(PreparedEntry {
            category,
            tags: encoded,
        })
    }
}

pub(crate) fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(KnowledgeError::validation("id must not be empty"));
    }
    Ok(())
}
