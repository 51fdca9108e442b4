//! Reshapes raw Datadog log events into a fixed set of fields.

use serde::Serialize;
use serde_json::Value;

pub const MISSING_ERROR_PLACEHOLDER: &str = "No error details available";

/// One simplified log event. Field order here is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLogRecord {
    // Error information
    pub status: Option<Value>,
    pub message: Option<Value>,
    pub error: Value,

    // Service components and cadence
    pub activity_type: Option<Value>,
    pub workflow_id: Option<Value>,
    pub task_list: Option<Value>,
    pub worker_id: Option<Value>,
    pub timestamp: Option<Value>,
    pub domain: Option<Value>,
    pub run_id: Option<Value>,

    // Infrastructure
    pub host: Option<Value>,
    pub hostname: Option<Value>,

    // Additional debugging information
    pub caller: Option<Value>,
    pub stacktrace: Option<Value>,
}

impl NormalizedLogRecord {
    pub fn from_raw(record: &Value) -> Self {
        let top = |key: &str| lookup(record, &["attributes", key]).cloned();
        let custom = |key: &str| lookup(record, &["attributes", "attributes", key]).cloned();

        Self {
            status: top("status"),
            message: top("msg").or_else(|| top("message")),
            error: custom("error").unwrap_or_else(|| Value::from(MISSING_ERROR_PLACEHOLDER)),
            activity_type: custom("ActivityType"),
            workflow_id: custom("WorkflowID"),
            task_list: custom("TaskList"),
            worker_id: custom("WorkerID"),
            timestamp: top("timestamp"),
            domain: custom("Domain"),
            run_id: custom("RunID"),
            host: top("host"),
            hostname: custom("hostname"),
            caller: custom("caller"),
            stacktrace: custom("stacktrace"),
        }
    }
}

/// Walks `path` through nested objects. Missing keys, non-object
/// intermediates and explicit nulls all count as absent.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .filter(|found| !found.is_null())
}

pub fn normalize(records: &[Value]) -> Vec<NormalizedLogRecord> {
    records.iter().map(NormalizedLogRecord::from_raw).collect()
}
