use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LorebookConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub entries: EntryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// `"stdio"` (MCP only) or `"http"` (REST API plus MCP at `/mcp`).
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    /// Logical collection name reported by `stats`.
    pub collection: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `"local"` (ONNX Runtime) or `"hashing"` (offline feature hashing).
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub default_list_limit: usize,
    pub max_list_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EntryConfig {
    pub default_category: String,
    pub max_content_bytes: usize,
    pub max_category_bytes: usize,
    pub max_tags_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 8000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_lorebook_dir()
            .join("knowledge.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            collection: "ai_knowledge".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_lorebook_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "paraphrase-multilingual-MiniLM-L12-v2".into(),
            cache_dir,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            max_top_k: 100,
            default_list_limit: 20,
            max_list_limit: 1000,
        }
    }
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            default_category: "general".into(),
            max_content_bytes: 10_000,
            max_category_bytes: 100,
            max_tags_bytes: 500,
        }
    }
}

/// Returns `~/.lorebook/`, or `./.lorebook/` when no home directory is known.
pub fn default_lorebook_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lorebook")
}

/// Returns the default config file path: `~/.lorebook/config.toml`
pub fn default_config_path() -> PathBuf {
    default_lorebook_dir().join("config.toml")
}

impl LorebookConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            LorebookConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `LOREBOOK_*` environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("LOREBOOK_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("LOREBOOK_COLLECTION") {
            self.storage.collection = val;
        }
        if let Ok(val) = std::env::var("LOREBOOK_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("LOREBOOK_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("LOREBOOK_PORT") {
            self.server.port = val
                .parse()
                .with_context(|| format!("LOREBOOK_PORT is not a valid port: {val}"))?;
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
