//! MCP `update_knowledge` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateKnowledgeParams {
    #[schemars(description = "ID of the entry to replace. The ID is kept after the update.")]
    pub id: String,

    #[schemars(description = "Replacement text")]
    pub content: String,

    #[schemars(description = "Replacement category. Defaults to 'general'.")]
    pub category: Option<String>,

    #[schemars(description = "Replacement tags")]
    #[serde(default)]
    pub tags: Vec<String>,
}
