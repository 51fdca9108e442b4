use anyhow::Result;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext};
use std::sync::Arc;

use crate::{
    backend::{DatadogClient, LogBackend},
    config::Config,
    logging::DebugLog,
    tools::{GetLogsTool, ToolRegistry},
};

#[derive(Clone)]
pub struct ProdSyncServer {
    registry: Arc<ToolRegistry>,
}

impl ProdSyncServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Server exposing `get_logs` against the given backend
    pub fn with_backend(backend: Arc<dyn LogBackend>, debug_log: DebugLog) -> Self {
        let mut registry = ToolRegistry::new();
        registry.register(GetLogsTool::new(backend, debug_log));
        Self::new(registry)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = DatadogClient::new(&config.datadog)?;
        tracing::info!("Datadog endpoint: {}", client.base_url());

        let debug_log = DebugLog::new(&config.log.debug_log_dir);
        Ok(Self::with_backend(Arc::new(client), debug_log))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl ServerHandler for ProdSyncServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "ProdSync MCP Server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Use get_logs to search Datadog logs for a service in a given environment (int, personal-dev, dev, prod), optionally narrowed by severity and time window."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.registry.list_tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();

        self.registry
            .invoke(&request.name, arguments)
            .await
            .map_err(McpError::from)
    }
}
