use chrono::{DateTime, Utc};

/// Placeholder recorded when a log line omits the model, session id or cwd.
pub const UNKNOWN: &str = "unknown";

/// One assistant response's token usage, as read from a usage log line.
#[derive(Clone, Debug, PartialEq)]
pub struct UsageEntry {
    pub timestamp: DateTime<Utc>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    pub model: String,
    pub session_id: String,
    pub cwd: String,
    /// Pre-computed cost (`costUSD`) when the log line carries one
    pub cost_usd: Option<f64>,
    pub message_id: Option<String>,
    pub request_id: Option<String>,
}

impl UsageEntry {
    /// Entry at `timestamp` with zero usage and placeholder identifiers.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            input_tokens: 0,
            output_tokens: 0,
            cache_creation_tokens: 0,
            cache_read_tokens: 0,
            model: UNKNOWN.to_string(),
            session_id: UNKNOWN.to_string(),
            cwd: UNKNOWN.to_string(),
            cost_usd: None,
            message_id: None,
            request_id: None,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens + self.cache_creation_tokens + self.cache_read_tokens
    }

    /// `message.id:requestId`, used to drop repeated copies of a streamed response
    pub fn dedup_key(&self) -> Option<String> {
        match (self.message_id.as_deref(), self.request_id.as_deref()) {
            (Some(m), Some(r)) => Some(format!("{m}:{r}")),
            _ => None,
        }
    }
}
