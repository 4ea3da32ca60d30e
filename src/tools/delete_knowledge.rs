//! MCP `delete_knowledge` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteKnowledgeParams {
    #[schemars(description = "ID of the entry to delete")]
    pub id: String,
}
