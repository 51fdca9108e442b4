//! Client for the Datadog Logs Search API (v2).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{BackendError, LogBackend};
use crate::config::DatadogConfig;
use crate::query::TimeRange;

const SEARCH_PATH: &str = "/api/v2/logs/events/search";

pub struct DatadogClient {
    client: Client,
    base_url: String,
    api_key: String,
    app_key: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    filter: SearchFilter<'a>,
    page: SearchPage,
}

#[derive(Debug, Serialize)]
struct SearchFilter<'a> {
    query: &'a str,
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
struct SearchPage {
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<Value>,
}

impl DatadogClient {
    pub fn new(config: &DatadogConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            api_key: config.api_key.clone(),
            app_key: config.app_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one search and return the raw `data` events
    pub async fn list_logs(
        &self,
        query: &str,
        range: &TimeRange,
        limit: i64,
    ) -> Result<Vec<Value>, BackendError> {
        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let payload = SearchRequest {
            filter: SearchFilter {
                query,
                from: range.start_iso(),
                to: range.end_iso(),
            },
            page: SearchPage { limit },
        };

        tracing::debug!("POST {url} query={query}");

        let response = self
            .client
            .post(&url)
            .header("DD-API-KEY", &self.api_key)
            .header("DD-APPLICATION-KEY", &self.app_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("Datadog returned {status} for query {query}");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        let events = parsed.data.unwrap_or_default();
        tracing::debug!("Datadog returned {} events", events.len());
        Ok(events)
    }
}

#[async_trait]
impl LogBackend for DatadogClient {
    async fn search_logs(
        &self,
        query: &str,
        range: &TimeRange,
        limit: i64,
    ) -> Result<Vec<Value>, BackendError> {
        self.list_logs(query, range, limit).await
    }
}

// Datadog reports failures as {"errors": ["..."]}; anything else is passed on raw.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && !parsed.errors.is_empty()
    {
        return parsed
            .errors
            .iter()
            .map(|e| match e {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("Unknown error").to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        extract::State,
        http::{HeaderMap, StatusCode, header},
        response::IntoResponse,
        routing::post,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured {
        request: Arc<Mutex<Option<(HeaderMap, Value)>>>,
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: String) -> DatadogClient {
        let mut config = DatadogConfig::new("test-api-key", "test-app-key");
        config.api_url = Some(base_url);
        config.timeout_secs = 5;
        DatadogClient::new(&config).unwrap()
    }

    fn range() -> TimeRange {
        TimeRange {
            start: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().unwrap(),
        }
    }

    #[tokio::test]
    async fn sends_search_request_and_returns_data() {
        let captured = Captured::default();

        async fn handler(
            State(captured): State<Captured>,
            headers: HeaderMap,
            body: String,
        ) -> impl IntoResponse {
            let parsed: Value = serde_json::from_str(&body).unwrap();
            *captured.request.lock().unwrap() = Some((headers, parsed));
            (
                [(header::CONTENT_TYPE, "application/json")],
                json!({ "data": [{ "id": "1" }, { "id": "2" }] }).to_string(),
            )
        }

        let router = Router::new()
            .route("/api/v2/logs/events/search", post(handler))
            .with_state(captured.clone());
        let client = client_for(spawn_stub(router).await);

        let events = client
            .list_logs("service:checkout AND status:error AND env:prod", &range(), 20)
            .await
            .unwrap();
        assert_eq!(events, vec![json!({ "id": "1" }), json!({ "id": "2" })]);

        let (headers, body) = captured.request.lock().unwrap().take().unwrap();
        assert_eq!(headers["dd-api-key"], "test-api-key");
        assert_eq!(headers["dd-application-key"], "test-app-key");
        assert_eq!(
            body,
            json!({
                "filter": {
                    "query": "service:checkout AND status:error AND env:prod",
                    "from": "2024-03-01T08:00:00.000Z",
                    "to": "2024-03-01T09:00:00.000Z"
                },
                "page": { "limit": 20 }
            })
        );
    }

    #[tokio::test]
    async fn missing_data_is_empty() {
        let router = Router::new().route(
            "/api/v2/logs/events/search",
            post(|| async { json!({ "meta": { "status": "done" } }).to_string() }),
        );
        let client = client_for(spawn_stub(router).await);

        let events = client.list_logs("q", &range(), 5).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn error_status_carries_datadog_errors() {
        let router = Router::new().route(
            "/api/v2/logs/events/search",
            post(|| async {
                (
                    StatusCode::FORBIDDEN,
                    json!({ "errors": ["Forbidden", "Invalid application key"] }).to_string(),
                )
            }),
        );
        let client = client_for(spawn_stub(router).await);

        let err = client.list_logs("q", &range(), 5).await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 403, .. }));
        assert_eq!(err.to_string(), "HTTP 403: Forbidden, Invalid application key");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let router = Router::new().route(
            "/api/v2/logs/events/search",
            post(|| async { "<html>maintenance</html>" }),
        );
        let client = client_for(spawn_stub(router).await);

        let err = client.list_logs("q", &range(), 5).await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}"));
        let err = client.list_logs("q", &range(), 5).await.unwrap_err();
        assert!(matches!(err, BackendError::Http(_)));
    }

    #[test]
    fn error_message_fallbacks() {
        assert_eq!(error_message("", Some("Bad Gateway")), "Bad Gateway");
        assert_eq!(error_message("  plain text  ", None), "plain text");
        assert_eq!(error_message(r#"{"errors":[]}"#, None), r#"{"errors":[]}"#);
        assert_eq!(error_message(r#"{"errors":[{"detail":"x"}]}"#, None), r#"{"detail":"x"}"#);
    }

    #[test]
    fn default_base_url_targets_site() {
        let client = DatadogClient::new(&DatadogConfig::new("a", "b")).unwrap();
        assert_eq!(client.base_url(), "https://api.datadoghq.com");
    }
}
