use super::types::StatsResponse;
use super::{KnowledgeStore, Result};

impl KnowledgeStore {
    pub fn stats(&self) -> Result<StatsResponse> {
        Ok(StatsResponse {
            total: self.index.count()?,
            collection: self.collection().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::store;
    use super::super::NewEntry;

    #[test]
    fn total_tracks_writes_and_deletes() {
        let store = store();
        assert_eq!(store.stats().unwrap().total, 0);

        let id = store.write(&NewEntry::new("one")).unwrap().id;
        store.write(&NewEntry::new("two")).unwrap();
        store.write(&NewEntry::new("two")).unwrap();
        assert_eq!(store.stats().unwrap().total, 2);

        store.delete(&id).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.collection, "test");
    }
}
