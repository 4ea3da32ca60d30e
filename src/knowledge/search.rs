use super::types::{
    format_time, similarity_percent, KnowledgeEntry, ListRequest, ListResponse, SearchHit,
    SearchResponse,
};
use super::{store::require_id, tags, KnowledgeError, KnowledgeStore, Result};
use crate::index::{Filter, IndexRow};

impl KnowledgeStore {
    /// Nearest entries to `query` by cosine similarity, best first.
    pub fn search(&self, query: &str, top_k: Option<i64>) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Err(KnowledgeError::validation("query must not be empty"));
        }
        let top_k = self.resolve_top_k(top_k)?;

        let vector = self.embed(query)?;
        let hits = self.index.search(&vector, top_k)?;

        let results = hits
            .into_iter()
            .map(|hit| {
                let similarity = similarity_percent(hit.score);
                let entry = row_to_entry(hit.row)?;
                Ok(SearchHit {
                    id: entry.id,
                    content: entry.content,
                    category: entry.category,
                    tags: entry.tags,
                    similarity,
                    time: entry.time,
                    created_at: entry.created_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(top_k, results = results.len(), "knowledge searched");
        Ok(SearchResponse { results })
    }

    /// One page of entries in insertion order. `total` counts every entry
    /// matching the same filter, so a filtered listing can page to its end.
    pub fn list(&self, request: &ListRequest) -> Result<ListResponse> {
        let limit = match request.limit {
            None => self.settings.default_list_limit,
            Some(limit) if limit >= 1 && limit as u64 <= self.settings.max_list_limit as u64 => {
                limit as usize
            }
            Some(limit) => {
                return Err(KnowledgeError::validation(format!(
                    "limit must be between 1 and {}, got {limit}",
                    self.settings.max_list_limit
                )))
            }
        };
        let offset = match request.offset {
            None => 0,
            Some(offset) if offset >= 0 => offset as usize,
            Some(offset) => {
                return Err(KnowledgeError::validation(format!(
                    "offset must not be negative, got {offset}"
                )))
            }
        };

        let filter = match request.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => Filter::Category(category.to_string()),
            _ => Filter::All,
        };

        let results = self
            .index
            .query(&filter, limit, offset)?
            .into_iter()
            .map(row_to_entry)
            .collect::<Result<Vec<_>>>()?;
        let total = self.index.count_matching(&filter)?;

        Ok(ListResponse { results, total })
    }

    /// Fetch a single entry by id.
    pub fn get(&self, id: &str) -> Result<Option<KnowledgeEntry>> {
        require_id(id)?;
        self.index
            .query(&Filter::Id(id.to_string()), 1, 0)?
            .into_iter()
            .next()
            .map(row_to_entry)
            .transpose()
    }

    fn resolve_top_k(&self, top_k: Option<i64>) -> Result<usize> {
        let max = self.settings.max_top_k;
        match top_k {
            None => Ok(self.settings.default_top_k),
            Some(k) if k >= 1 && k as u64 <= max as u64 => Ok(k as usize),
            Some(k) => Err(KnowledgeError::validation(format!(
                "top_k must be between 1 and {max}, got {k}"
            ))),
        }
    }
}

fn row_to_entry(row: IndexRow) -> Result<KnowledgeEntry> {
    let tags = tags::decode(&row.tags)?;
    Ok(KnowledgeEntry {
        time: format_time(row.created_at),
        id: row.id,
        content: row.content,
        category: row.category,
        tags,
        created_at: row.created_at,
    })
}
