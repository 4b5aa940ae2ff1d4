use crate::models::entry::UsageEntry;
use chrono::{DateTime, Utc};

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
    pub cache_create: u64,
    pub cache_read: u64,
}

impl TokenCounts {
    pub fn add(&mut self, e: &UsageEntry) {
        self.input += e.input_tokens;
        self.output += e.output_tokens;
        self.cache_create += e.cache_creation_tokens;
        self.cache_read += e.cache_read_tokens;
    }

    pub fn total(&self) -> u64 {
        self.input + self.output + self.cache_create + self.cache_read
    }
}

/// A run of entries that falls inside one 5-hour usage window.
#[derive(Clone, Debug)]
pub struct SessionBlock {
    /// Hour-floor of the first entry
    pub start: DateTime<Utc>,
    /// Timestamp of the last entry
    pub end: DateTime<Utc>,
    pub is_active: bool,
    pub entries: Vec<UsageEntry>,
    pub tokens: TokenCounts,
}

/// Start and latest activity of the block that is still open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveSession {
    pub start: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}
