use super::types::DeleteOutcome;
use super::{store::require_id, KnowledgeStore, Result};
use crate::index::Filter;

impl KnowledgeStore {
    /// Remove the entry with `id`. Unknown ids succeed and report the same outcome.
    pub fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        require_id(id)?;
        let removed = self.index.delete(&Filter::Id(id.to_string()))?;
        self.index.flush()?;

        tracing::info!(id = %id, removed, "knowledge deleted");
        Ok(DeleteOutcome {
            status: "success",
            id: id.to_string(),
        })
    }
}
