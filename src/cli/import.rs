use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use lorebook::config::LorebookConfig;
use lorebook::knowledge::{NewEntry, WriteStatus};

/// Import format. Matches `export` output; fields other than content,
/// category and tags are ignored and ids are re-derived from content.
#[derive(Debug, Deserialize)]
struct ImportData {
    entries: Vec<NewEntry>,
}

/// Import entries from a JSON file through the normal write path.
pub async fn import(config: &LorebookConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;
    let data: ImportData = serde_json::from_str(&json).context("failed to parse import JSON")?;

    let store = Arc::new(crate::server::setup_store(config)?);
    println!("Importing {} entries...", data.entries.len());

    let (imported, skipped, failed) = tokio::task::spawn_blocking(move || {
        let (mut imported, mut skipped, mut failed) = (0u64, 0u64, 0u64);
        for entry in &data.entries {
            match store.write(entry) {
                Ok(outcome) if outcome.status == WriteStatus::Exists => skipped += 1,
                Ok(_) => imported += 1,
                Err(e) => {
                    eprintln!("Warning: failed to import entry: {e}");
                    failed += 1;
                }
            }
        }
        (imported, skipped, failed)
    })
    .await?;

    println!("Import complete:");
    println!("  Imported: {imported}");
    println!("  Skipped:  {skipped} (already exist)");
    if failed > 0 {
        println!("  Failed:   {failed}");
    }

    Ok(())
}
