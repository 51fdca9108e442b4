use async_trait::async_trait;
use rmcp::model::{CallToolResult, JsonObject, Tool};
use std::sync::Arc;

use super::ToolError;

/// A tool the server exposes: its catalog entry plus the code that runs it
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn tool(&self) -> Tool;

    async fn call(&self, arguments: JsonObject) -> Result<CallToolResult, ToolError>;
}

struct RegisteredTool {
    tool: Tool,
    handler: Arc<dyn ToolHandler>,
}

/// Name-keyed set of tools, listed in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any earlier tool with the same name
    pub fn register(&mut self, handler: impl ToolHandler + 'static) -> &mut Self {
        let tool = handler.tool();
        let handler: Arc<dyn ToolHandler> = Arc::new(handler);

        match self.tools.iter_mut().find(|t| t.tool.name == tool.name) {
            Some(existing) => {
                tracing::warn!("Replacing tool registration: {}", tool.name);
                *existing = RegisteredTool { tool, handler };
            }
            None => {
                tracing::debug!("Registered tool: {}", tool.name);
                self.tools.push(RegisteredTool { tool, handler });
            }
        }

        self
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.tool.clone()).collect()
    }

    #[cfg(test)]
    fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.tool.name == name)
    }

    pub async fn invoke(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        let Some(entry) = self.tools.iter().find(|t| t.tool.name == name) else {
            tracing::warn!("Call to unknown tool: {name}");
            return Err(ToolError::UnknownTool {
                name: name.to_string(),
            });
        };

        tracing::info!("Calling tool: {name}");
        let result = entry.handler.call(arguments).await;

        if let Err(e) = &result {
            tracing::error!("Tool {name} failed: {e}");
        }
        result
    }
}
