use async_trait::async_trait;
use chrono::Utc;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::Value;
use std::sync::Arc;

use super::{ToolError, ToolHandler, create_tool};
use crate::backend::LogBackend;
use crate::logging::DebugLog;
use crate::normalize::normalize;
use crate::query::{LogQueryRequest, build_query_string, build_time_range, parse_timestamp};

pub const TOOL_NAME: &str = "get_logs";

pub const REQUIRED_FIELDS_MESSAGE: &str = "Service and Env are required. \n Name of the service to get logs for \n Environment to get logs from (int, personal-dev, dev, prod)";

const DEFAULT_SEVERITY: &str = "Error";
const DEFAULT_LOOKBACK_MINUTES: f64 = 60.0;
const DEFAULT_LIMIT: i64 = 20;

pub fn get_logs_tool() -> Tool {
    create_tool(
        TOOL_NAME,
        "Gets logs filtered by service name, severity level, and environment within a specified time range.",
        serde_json::json!({
            "service": {
                "type": "string",
                "description": "Name of the service to get logs for"
            },
            "severity": {
                "type": "string",
                "description": "Severity of the logs to get (Error, Warn, Info). Default: Error",
                "enum": ["Error", "Warn", "Info"]
            },
            "env": {
                "type": "string",
                "description": "Environment to get logs from (int, personal-dev, dev, prod)",
                "enum": ["int", "personal-dev", "dev", "prod"]
            },
            "lookback_minutes": {
                "type": "integer",
                "description": "Number of minutes to look back from now. Default: 60. Examples: 60, 30, 15"
            },
            "start_time_iso": {
                "type": "string",
                "description": "Start time in ISO format (YYYY-MM-DD HH:MM:SS). Leave empty to use lookback_minutes"
            },
            "end_time_iso": {
                "type": "string",
                "description": "End time in ISO format (YYYY-MM-DD HH:MM:SS). Leave empty to default to current time"
            },
            "limit": {
                "type": "integer",
                "description": "Maximum number of logs to return. Default: 20"
            }
        }),
        // severity is listed even though it has a runtime default; clients rely on this shape
        Some(&["service", "severity", "env"]),
    )
}

/// Searches logs through a [`LogBackend`] and returns normalized records
pub struct GetLogsTool {
    backend: Arc<dyn LogBackend>,
    debug_log: DebugLog,
}

impl GetLogsTool {
    pub fn new(backend: Arc<dyn LogBackend>, debug_log: DebugLog) -> Self {
        Self { backend, debug_log }
    }

    pub async fn get_logs(&self, arguments: JsonObject) -> Result<CallToolResult, ToolError> {
        let request = parse_arguments(&arguments)?;
        self.debug_log
            .log(format!("get_logs request: {request:?}"))
            .await;

        let range = build_time_range(&request, Utc::now());
        let query = build_query_string(&request);
        self.debug_log
            .log(format!(
                "Querying Datadog: {query} | from: {} | to: {} | limit: {}",
                range.start_iso(),
                range.end_iso(),
                request.limit
            ))
            .await;

        let records = match self.backend.search_logs(&query, &range, request.limit).await {
            Ok(records) => records,
            Err(e) => {
                self.debug_log.log(format!("Datadog error: {e}")).await;
                return Err(ToolError::Backend(e.to_string()));
            }
        };

        self.debug_log
            .log(format!(
                "Datadog response: {}",
                serde_json::to_string_pretty(&records)
                    .unwrap_or_else(|e| format!("<unprintable: {e}>"))
            ))
            .await;

        let normalized = normalize(&records);
        tracing::info!("get_logs returned {} records for {query}", normalized.len());

        let text = serde_json::to_string_pretty(&normalized)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[async_trait]
impl ToolHandler for GetLogsTool {
    fn tool(&self) -> Tool {
        get_logs_tool()
    }

    async fn call(&self, arguments: JsonObject) -> Result<CallToolResult, ToolError> {
        self.get_logs(arguments).await
    }
}

/// Coerce and default the raw argument bag.
///
/// The required-field check runs before anything else is interpreted so a
/// bad call never reaches time computation or the backend.
pub fn parse_arguments(arguments: &JsonObject) -> Result<LogQueryRequest, ToolError> {
    let service = coerce_string(arguments.get("service"));
    let env = coerce_string(arguments.get("env"));

    if service.is_empty() || env.is_empty() {
        return Err(ToolError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    }

    let severity = Some(coerce_string(arguments.get("severity")))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SEVERITY.to_string());

    Ok(LogQueryRequest {
        service,
        severity,
        env,
        lookback_minutes: coerce_lookback(arguments)?,
        start_time: coerce_timestamp(arguments, "start_time_iso")?,
        end_time: coerce_timestamp(arguments, "end_time_iso")?,
        limit: coerce_integer(arguments.get("limit")).unwrap_or(DEFAULT_LIMIT),
    })
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// Zero, empty and unparseable values fall back to the default like an omitted one.
fn coerce_integer(value: Option<&Value>) -> Option<i64> {
    let n = match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }?;
    (n != 0).then_some(n)
}

// Fractions are kept; zero and empty take the default, anything else non-numeric is rejected.
fn coerce_lookback(arguments: &JsonObject) -> Result<f64, ToolError> {
    const FIELD: &str = "lookback_minutes";

    let minutes = match arguments.get(FIELD) {
        None | Some(Value::Null) => return Ok(DEFAULT_LOOKBACK_MINUTES),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(DEFAULT_LOOKBACK_MINUTES),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    }
    .filter(|m| m.is_finite());

    match minutes {
        Some(m) if m == 0.0 => Ok(DEFAULT_LOOKBACK_MINUTES),
        Some(m) => Ok(m),
        None => Err(ToolError::Validation(format!(
            "Invalid {FIELD}: '{}'. Expected a number of minutes",
            coerce_string(arguments.get(FIELD))
        ))),
    }
}

fn coerce_timestamp(
    arguments: &JsonObject,
    field: &str,
) -> Result<Option<chrono::DateTime<Utc>>, ToolError> {
    let raw = coerce_string(arguments.get(field));
    if raw.trim().is_empty() {
        return Ok(None);
    }

    parse_timestamp(&raw).map(Some).ok_or_else(|| {
        ToolError::Validation(format!(
            "Invalid {field}: '{raw}'. Expected ISO format (YYYY-MM-DD HH:MM:SS or RFC 3339)"
        ))
    })
}
