pub mod delete_knowledge;
pub mod list_knowledge;
pub mod search_knowledge;
pub mod update_knowledge;
pub mod write_knowledge;

use std::sync::Arc;

use delete_knowledge::DeleteKnowledgeParams;
use list_knowledge::ListKnowledgeParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use search_knowledge::SearchKnowledgeParams;
use serde::Serialize;
use update_knowledge::UpdateKnowledgeParams;
use write_knowledge::WriteKnowledgeParams;

use crate::knowledge::{self, KnowledgeStore, ListRequest, NewEntry};

/// The Lorebook MCP tool handler. Every tool delegates to the shared
/// [`KnowledgeStore`] on the blocking pool and returns its outcome as a JSON string.
#[derive(Clone)]
pub struct LorebookTools {
    tool_router: ToolRouter<Self>,
    store: Arc<KnowledgeStore>,
}

#[tool_router]
impl LorebookTools {
    pub fn new(store: Arc<KnowledgeStore>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            store,
        }
    }

    /// Store a piece of knowledge.
    #[tool(description = "Store a piece of knowledge. Writing text that is already stored returns status 'exists' with the existing ID.")]
    async fn write_knowledge(
        &self,
        Parameters(params): Parameters<WriteKnowledgeParams>,
    ) -> Result<String, String> {
        if params.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }
        tracing::info!(content_len = params.content.len(), "write_knowledge called");

        let entry = NewEntry {
            content: params.content,
            category: params.category,
            tags: params.tags,
        };
        self.run(move |store| store.write(&entry)).await
    }

    /// Semantic search over stored knowledge.
    #[tool(description = "Search stored knowledge by meaning. Returns the closest entries with a similarity percentage.")]
    async fn search_knowledge(
        &self,
        Parameters(params): Parameters<SearchKnowledgeParams>,
    ) -> Result<String, String> {
        if params.query.trim().is_empty() {
            return Err("query must not be empty".into());
        }
        if let Some(top_k) = params.top_k {
            if top_k <= 0 {
                return Err(format!("top_k must be positive, got {top_k}"));
            }
        }
        tracing::info!(query = %params.query, top_k = ?params.top_k, "search_knowledge called");

        let SearchKnowledgeParams { query, top_k } = params;
        self.run(move |store| store.search(&query, top_k)).await
    }

    #[tool(description = "Replace the content, category and tags of an entry. The entry keeps its ID.")]
    async fn update_knowledge(
        &self,
        Parameters(params): Parameters<UpdateKnowledgeParams>,
    ) -> Result<String, String> {
        if params.id.trim().is_empty() {
            return Err("id must not be empty".into());
        }
        if params.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }
        tracing::info!(id = %params.id, "update_knowledge called");

        let id = params.id;
        let entry = NewEntry {
            content: params.content,
            category: params.category,
            tags: params.tags,
        };
        self.run(move |store| store.update(&id, &entry)).await
    }

    #[tool(description = "Delete an entry by ID. Unknown IDs also report success.")]
    async fn delete_knowledge(
        &self,
        Parameters(params): Parameters<DeleteKnowledgeParams>,
    ) -> Result<String, String> {
        if params.id.trim().is_empty() {
            return Err("id must not be empty".into());
        }
        tracing::info!(id = %params.id, "delete_knowledge called");

        let id = params.id;
        self.run(move |store| store.delete(&id)).await
    }

    /// Page through stored knowledge.
    #[tool(description = "List stored entries in insertion order, optionally filtered by category.")]
    async fn list_knowledge(
        &self,
        Parameters(params): Parameters<ListKnowledgeParams>,
    ) -> Result<String, String> {
        tracing::info!(limit = ?params.limit, offset = ?params.offset, "list_knowledge called");

        let request = ListRequest {
            limit: params.limit,
            offset: params.offset,
            category: params.category,
        };
        self.run(move |store| store.list(&request)).await
    }

    #[tool(description = "Get the number of stored entries and the collection name.")]
    async fn knowledge_stats(&self) -> Result<String, String> {
        tracing::info!("knowledge_stats called");
        self.run(|store| store.stats()).await
    }
}

impl LorebookTools {
    /// Run a store operation on the blocking pool and serialize its outcome.
    async fn run<T, F>(&self, op: F) -> Result<String, String>
    where
        F: FnOnce(&KnowledgeStore) -> knowledge::Result<T> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| format!("store task failed: {e}"))?
            .map_err(|e| e.to_string())?;

        serde_json::to_string(&outcome).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for LorebookTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Lorebook is a semantic knowledge store. Use write_knowledge to save text, \
                 search_knowledge to find related entries, and list_knowledge to browse."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
