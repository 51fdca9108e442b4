mod error;
pub mod get_logs;
mod registry;

pub use error::ToolError;
pub use get_logs::GetLogsTool;
pub use registry::{ToolHandler, ToolRegistry};

use rmcp::model::{JsonObject, Tool};
use serde_json::Value;
use std::sync::Arc;

pub(crate) fn create_tool(
    name: &'static str,
    description: &'static str,
    properties: Value,
    required: Option<&[&str]>,
) -> Tool {
    let mut schema = JsonObject::new();
    schema.insert("type".into(), "object".into());
    schema.insert("properties".into(), properties);
    if let Some(required) = required {
        schema.insert("required".into(), required.iter().copied().collect());
    }

    Tool::new(name, description, Arc::new(schema))
}
