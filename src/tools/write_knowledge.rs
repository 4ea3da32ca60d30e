//! MCP `write_knowledge` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteKnowledgeParams {
    #[schemars(description = "The text to store. Identical text is stored only once.")]
    pub content: String,

    #[schemars(description = "Optional category label. Defaults to 'general'.")]
    pub category: Option<String>,

    #[schemars(description = "Optional list of tags")]
    #[serde(default)]
    pub tags: Vec<String>,
}
