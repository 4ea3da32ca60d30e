use anyhow::Result;

use lorebook::config::LorebookConfig;

/// Display store statistics in the terminal.
pub fn stats(config: &LorebookConfig) -> Result<()> {
    let store = crate::server::setup_store(config)?;
    let response = store.stats()?;

    let db_path = config.resolved_db_path();
    let db_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    println!("Knowledge Statistics");
    println!("{}", "=".repeat(40));
    println!("  Collection:          {}", response.collection);
    println!("  Entries:             {}", response.total);
    println!("  Database:            {}", db_path.display());
    println!("  Database size:       {db_size} bytes");

    Ok(())
}
