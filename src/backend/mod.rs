mod datadog;

pub use datadog::DatadogClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::query::TimeRange;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Message(String),
}

/// A log search service.
///
/// Implementations make a single attempt per call; retries, paging and
/// rate limiting are left to the caller.
#[async_trait]
pub trait LogBackend: Send + Sync {
    async fn search_logs(
        &self,
        query: &str,
        range: &TimeRange,
        limit: i64,
    ) -> Result<Vec<Value>, BackendError>;
}
