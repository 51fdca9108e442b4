use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} environment variable is required")]
    Missing { var: String },

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse {var} as {expected_type}: {source}")]
    ParseError {
        var: String,
        expected_type: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub const DEFAULT_SITE: &str = "datadoghq.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Credentials and endpoint settings for the Datadog Logs API
#[derive(Clone)]
pub struct DatadogConfig {
    pub api_key: String,
    pub app_key: String,
    pub site: String,
    /// Full base URL override, mainly for proxies and tests
    pub api_url: Option<String>,
    pub timeout_secs: u64,
}

impl DatadogConfig {
    pub fn new(api_key: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_key: app_key.into(),
            site: DEFAULT_SITE.to_string(),
            api_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Base URL requests are sent to, without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://api.{}", self.site),
        }
    }
}

// Keys never end up in logs.
impl fmt::Debug for DatadogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatadogConfig")
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .field("site", &self.site)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Configuration for diagnostic logging
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug_log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            debug_log_dir: cwd.join("logs"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    StreamableHttp,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Transport::Stdio),
            "streamable-http" | "http" => Ok(Transport::StreamableHttp),
            other => Err(ConfigError::InvalidValue {
                var: "PRODSYNC_TRANSPORT".to_string(),
                message: format!("unknown transport '{other}', use 'stdio' or 'streamable-http'"),
            }),
        }
    }
}

/// Configuration for transport layer
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub transport: Transport,
    pub http_addr: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
        }
    }
}

/// Main configuration container
#[derive(Debug, Clone)]
pub struct Config {
    pub datadog: DatadogConfig,
    pub log: LogConfig,
    pub transport: TransportConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &str| {
            lookup(var)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::Missing {
                    var: var.to_string(),
                })
        };

        let api_key = required("DATADOG_API_KEY")?;
        let app_key = required("DATADOG_APP_KEY")?;
        let mut datadog = DatadogConfig::new(api_key, app_key);

        // DD_SITE
        if let Some(site) = lookup("DD_SITE").filter(|s| !s.is_empty()) {
            datadog.site = site;
        }

        // DATADOG_API_URL
        datadog.api_url = lookup("DATADOG_API_URL").filter(|s| !s.is_empty());

        // DATADOG_TIMEOUT_SECS
        if let Some(timeout_str) = lookup("DATADOG_TIMEOUT_SECS") {
            datadog.timeout_secs = timeout_str.parse().map_err(|e| ConfigError::ParseError {
                var: "DATADOG_TIMEOUT_SECS".to_string(),
                expected_type: "u64".to_string(),
                source: Box::new(e),
            })?;
        }

        let mut log = LogConfig::default();

        // PRODSYNC_LOG_DIR
        if let Some(dir) = lookup("PRODSYNC_LOG_DIR").filter(|s| !s.is_empty()) {
            log.debug_log_dir = PathBuf::from(dir);
        }

        let mut transport = TransportConfig::default();

        // PRODSYNC_TRANSPORT
        if let Some(name) = lookup("PRODSYNC_TRANSPORT") {
            transport.transport = name.parse()?;
        }

        // PRODSYNC_HTTP_ADDR
        if let Some(addr) = lookup("PRODSYNC_HTTP_ADDR").filter(|s| !s.is_empty()) {
            transport.http_addr = addr;
        }

        if datadog.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "DATADOG_TIMEOUT_SECS".to_string(),
                message: "timeout must be greater than 0".to_string(),
            });
        }

        Ok(Config {
            datadog,
            log,
            transport,
        })
    }
}
