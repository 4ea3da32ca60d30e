//! Server startup for the stdio and HTTP transports.
//!
//! [`setup_store`] wires the embedding provider and the SQLite index into a
//! [`KnowledgeStore`]; [`serve_stdio`] and [`serve_http`] expose it.

use std::sync::Arc;

use anyhow::{Context, Result};
use lorebook::api;
use lorebook::config::LorebookConfig;
use lorebook::db;
use lorebook::embedding;
use lorebook::index::SqliteVecIndex;
use lorebook::knowledge::{KnowledgeStore, StoreSettings};
use lorebook::tools::LorebookTools;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use rmcp::ServiceExt;

/// Name recorded in `schema_meta` for the configured provider.
fn model_id(config: &LorebookConfig) -> &str {
    match config.embedding.provider.as_str() {
        "hashing" => "hashing",
        _ => &config.embedding.model,
    }
}

/// Open the database, create the embedding provider, and build the store.
pub fn setup_store(config: &LorebookConfig) -> Result<KnowledgeStore> {
    let provider = embedding::create_provider(&config.embedding)?;
    let embedder: Arc<dyn embedding::EmbeddingProvider> = Arc::from(provider);
    tracing::info!(provider = %config.embedding.provider, "embedding provider ready");

    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path, embedder.dimensions())
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    tracing::info!(db = %db_path.display(), "database ready");

    let configured = model_id(config);
    match db::migrations::get_embedding_model(&conn)? {
        Some(stored) if stored != configured => {
            tracing::warn!(
                stored = %stored,
                configured = %configured,
                "embedding model changed; existing vectors were produced by a different model"
            );
        }
        Some(_) => {}
        None => db::migrations::set_embedding_model(&conn, configured)?,
    }

    let index = Arc::new(SqliteVecIndex::new(
        conn,
        config.storage.collection.clone(),
        embedder.dimensions(),
    ));
    KnowledgeStore::new(embedder, index, StoreSettings::from_config(config))
}

/// Start the MCP server over stdio.
pub async fn serve_stdio(config: LorebookConfig) -> Result<()> {
    tracing::info!("starting Lorebook MCP server on stdio");

    let store = Arc::new(setup_store(&config)?);
    let server = LorebookTools::new(store).serve(rmcp::transport::stdio()).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");
    Ok(())
}

/// Start the HTTP API with the MCP tools mounted at `/mcp`.
pub async fn serve_http(config: LorebookConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting Lorebook HTTP server");

    let store = Arc::new(setup_store(&config)?);

    let mcp_store = Arc::clone(&store);
    let mcp = StreamableHttpService::new(
        move || Ok(LorebookTools::new(Arc::clone(&mcp_store))),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = api::with_layers(api::routes(store).nest_service("/mcp", mcp));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "listening at http://{bind_addr} (MCP at /mcp)");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
