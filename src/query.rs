//! Translation of a validated `get_logs` request into a backend query.
//!
//! Both builders are pure: the current time is passed in so callers (and
//! tests) decide what "now" means.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};

/// Log criticality as exposed to the calling agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl Severity {
    /// Maps a human-facing label. Unrecognised labels, including the empty
    /// string, fall back to `Error` instead of being rejected.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Warn" => Severity::Warn,
            "Info" => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Datadog `status` facet value
    pub fn as_status(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
        }
    }
}

/// A validated log query, one per invocation
#[derive(Debug, Clone, PartialEq)]
pub struct LogQueryRequest {
    pub service: String,
    /// Raw severity label, mapped lazily so unknown values can fall back
    pub severity: String,
    pub env: String,
    /// Fractional minutes are honoured at millisecond precision
    pub lookback_minutes: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn start_iso(&self) -> String {
        format_iso(self.start)
    }

    pub fn end_iso(&self) -> String {
        format_iso(self.end)
    }
}

/// `end` defaults to `now`; `start` defaults to `end - lookback_minutes`.
/// An explicit start wins over the lookback. No ordering is enforced.
pub fn build_time_range(request: &LogQueryRequest, now: DateTime<Utc>) -> TimeRange {
    let end = request.end_time.unwrap_or(now);
    let start = request.start_time.unwrap_or_else(|| {
        TimeDelta::try_milliseconds((request.lookback_minutes * 60_000.0) as i64)
            .and_then(|lookback| end.checked_sub_signed(lookback))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    });
    TimeRange { start, end }
}

/// Values are inserted verbatim; nothing is escaped.
pub fn build_query_string(request: &LogQueryRequest) -> String {
    format!(
        "service:{} AND status:{} AND env:{}",
        request.service,
        Severity::from_label(&request.severity).as_status(),
        request.env
    )
}

/// Accepts RFC 3339 plus the offset-less `YYYY-MM-DD HH:MM:SS` shapes agents
/// tend to send. Offset-less values are read as UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn format_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
