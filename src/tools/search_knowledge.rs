//! MCP `search_knowledge` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchKnowledgeParams {
    #[schemars(description = "Natural language query")]
    pub query: String,

    #[schemars(description = "Maximum number of results, 1-100. Defaults to 5.")]
    pub top_k: Option<i64>,
}
