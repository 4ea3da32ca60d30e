//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use lorebook::config::LorebookConfig;
use lorebook::db;
use lorebook::embedding::EMBEDDING_DIM;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &LorebookConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `lorebook serve` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path, EMBEDDING_DIM)
        .context("failed to open database (may be corrupt or built for another dimension)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Lorebook Health Report");
    println!("======================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("sqlite-vec:        {}", report.sqlite_vec_version);
    println!("Collection:        {}", config.storage.collection);
    println!();
    println!("Embedding model:");
    println!("  Stored:          {}", report.embedding_model.as_deref().unwrap_or("(not set)"));
    println!("  Configured:      {}", config.embedding.model);
    println!(
        "  Dimensions:      {}",
        report.embedding_dim.map_or("(not set)".to_string(), |d| d.to_string())
    );
    if let Some(ref stored) = report.embedding_model {
        if config.embedding.provider == "local" && stored != &config.embedding.model {
            println!("  WARNING: model mismatch! Stored vectors came from a different model.");
        } else {
            println!("  Status:          OK");
        }
    }
    println!();
    println!("Row counts:");
    println!("  Entries:         {}", report.entry_count);
    println!("  Vectors:         {}", report.vector_count);
    if report.entry_count != report.vector_count {
        println!("  WARNING: entry and vector counts differ.");
    }
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.lorebook/knowledge.db");
        println!("  2. Or export from a good copy and reimport:");
        println!("     lorebook export > backup.json");
        println!("     lorebook import backup.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::format_bytes;

    #[test]
    fn formats_byte_sizes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
