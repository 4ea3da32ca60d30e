//! MCP `list_knowledge` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `list_knowledge` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListKnowledgeParams {
    #[schemars(description = "Page size, 1-1000. Defaults to 20.")]
    pub limit: Option<i64>,

    #[schemars(description = "Number of entries to skip. Defaults to 0.")]
    pub offset: Option<i64>,

    #[schemars(description = "Only list entries in this category")]
    pub category: Option<String>,
}
