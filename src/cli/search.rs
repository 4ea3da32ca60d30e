use anyhow::Result;
use std::sync::Arc;

use lorebook::config::LorebookConfig;

/// Run a one-off search from the terminal.
pub async fn search(config: &LorebookConfig, query: String, top_k: Option<i64>) -> Result<()> {
    let store = Arc::new(crate::server::setup_store(config)?);

    let response =
        tokio::task::spawn_blocking(move || store.search(&query, top_k)).await??;

    if response.results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", response.results.len());

    for (i, hit) in response.results.iter().enumerate() {
        let preview: String = if hit.content.chars().count() > 120 {
            format!("{}...", hit.content.chars().take(120).collect::<String>())
        } else {
            hit.content.clone()
        };

        println!(
            "  {}. [{}] {} ({:.2}%, {})",
            i + 1,
            hit.category,
            hit.id,
            hit.similarity,
            hit.time,
        );
        println!("     {preview}");
        if !hit.tags.is_empty() {
            println!("     tags: {}", hit.tags.join(", "));
        }
        println!();
    }

    Ok(())
}
