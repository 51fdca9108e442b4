use rmcp::{ErrorData as McpError, model::ErrorCode};
use thiserror::Error;

/// Per-call failures. None of these stop the server.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool")]
    UnknownTool { name: String },

    #[error("{0}")]
    Validation(String),

    #[error("Failed to fetch logs: {0}")]
    Backend(String),

    #[error("Failed to serialize logs: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ToolError> for McpError {
    fn from(e: ToolError) -> Self {
        let (code, data) = match &e {
            ToolError::UnknownTool { name } => (
                ErrorCode::METHOD_NOT_FOUND,
                Some(serde_json::json!({ "tool": name })),
            ),
            ToolError::Validation(_) => (ErrorCode::INVALID_PARAMS, None),
            ToolError::Backend(_) | ToolError::Serialization(_) => (ErrorCode::INTERNAL_ERROR, None),
        };

        McpError {
            code,
            message: e.to_string().into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_preserved_in_mcp_errors() {
        let unknown: McpError = ToolError::UnknownTool {
            name: "delete_everything".to_string(),
        }
        .into();
        assert_eq!(unknown.code, ErrorCode::METHOD_NOT_FOUND);
        assert_eq!(unknown.message, "Unknown tool");
        assert_eq!(
            unknown.data,
            Some(serde_json::json!({ "tool": "delete_everything" }))
        );

        let invalid: McpError = ToolError::Validation("service is required".to_string()).into();
        assert_eq!(invalid.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(invalid.message, "service is required");

        let backend: McpError = ToolError::Backend("timeout".to_string()).into();
        assert_eq!(backend.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(backend.message, "Failed to fetch logs: timeout");
    }
}
