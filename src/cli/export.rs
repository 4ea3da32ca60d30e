use anyhow::Result;
use serde::Serialize;

use lorebook::config::LorebookConfig;
use lorebook::knowledge::{KnowledgeEntry, ListRequest};

/// Export format, read back by `import`.
#[derive(Debug, Serialize)]
struct ExportData {
    collection: String,
    entries: Vec<KnowledgeEntry>,
}

/// Export all entries as JSON to stdout.
pub fn export(config: &LorebookConfig) -> Result<()> {
    let store = crate::server::setup_store(config)?;
    let page_size = store.settings().max_list_limit;

    let mut entries = Vec::new();
    loop {
        let page = store.list(&ListRequest {
            limit: Some(page_size as i64),
            offset: Some(entries.len() as i64),
            category: None,
        })?;
        let fetched = page.results.len();
        entries.extend(page.results);
        if fetched < page_size {
            break;
        }
    }

    let data = ExportData {
        collection: store.collection().to_string(),
        entries,
    };
    println!("{}", serde_json::to_string_pretty(&data)?);
    eprintln!("Exported {} entries.", data.entries.len());

    Ok(())
}
