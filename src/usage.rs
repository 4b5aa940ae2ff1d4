//! # Usage Module
//!
//! Reads Claude Code usage logs and transcripts.
//!
//! ## Key Functions
//!
//! - `parse_line`: Turns one JSONL line into a `UsageEntry` or a skip
//! - `parse_todays_file`: Streams one log file, keeping entries at/after a cutoff
//! - `load_entries_since`: Parses every log file of a store in parallel
//! - `load_session_usage`: Collects all entries and the cost of one session
//! - `calc_context_tokens`: Context window fill from a transcript

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::models::{ContextUsage, LogLine, UNKNOWN, UsageEntry};
use crate::pricing::{CostMode, entry_cost};
use crate::store::LogStore;
use crate::utils::context_limit_for_model_display;

/// Result of parsing a single log line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Entry(UsageEntry),
    Skip,
}

/// Parse an RFC 3339 timestamp; offset-less ISO timestamps are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

/// Parse one JSONL line. Anything that is not a timestamped usage record is a `Skip`.
pub fn parse_line(line: &str) -> LineOutcome {
    let t = line.trim();
    if t.is_empty() {
        return LineOutcome::Skip;
    }
    let parsed: LogLine = match serde_json::from_str(t) {
        Ok(v) => v,
        Err(_) => return LineOutcome::Skip,
    };
    let Some(timestamp) = parsed.timestamp.as_deref().and_then(parse_timestamp) else {
        return LineOutcome::Skip;
    };
    let Some(message) = parsed.message else {
        return LineOutcome::Skip;
    };
    let Some(usage) = message.usage else {
        return LineOutcome::Skip;
    };

    LineOutcome::Entry(UsageEntry {
        timestamp,
        input_tokens: usage.input_tokens.unwrap_or(0),
        output_tokens: usage.output_tokens.unwrap_or(0),
        cache_creation_tokens: usage.cache_creation_input_tokens.unwrap_or(0),
        cache_read_tokens: usage.cache_read_input_tokens.unwrap_or(0),
        model: non_empty_or_unknown(message.model),
        session_id: non_empty_or_unknown(parsed.session_id),
        cwd: non_empty_or_unknown(parsed.cwd),
        cost_usd: parsed.cost_usd,
        message_id: message.id,
        request_id: parsed.request_id,
    })
}

fn non_empty_or_unknown(v: Option<String>) -> String {
    v.filter(|s| !s.is_empty()).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Stream `path` and return every usage entry, skipping lines that do not parse.
/// An unreadable file yields no entries.
pub fn parse_file(path: &Path) -> Vec<UsageEntry> {
    parse_file_since(path, None)
}

fn parse_file_since(path: &Path, cutoff: Option<DateTime<Utc>>) -> Vec<UsageEntry> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "cannot open usage log");
            return Vec::new();
        }
    };
    let reader = BufReader::new(file);
    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        match parse_line(&line) {
            LineOutcome::Entry(e) if cutoff.is_none_or(|c| e.timestamp >= c) => entries.push(e),
            LineOutcome::Entry(_) => {}
            LineOutcome::Skip => skipped += 1,
        }
    }
    trace!(
        path = %path.display(),
        entries = entries.len(),
        skipped,
        "parsed usage log"
    );
    entries
}

/// Entries in `path` stamped at or after `cutoff`.
///
/// Files last modified before the cutoff are not opened: logs are append-only,
/// so such a file cannot hold newer lines.
pub fn parse_todays_file(path: &Path, cutoff: DateTime<Utc>) -> Vec<UsageEntry> {
    if let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) {
        let mtime: DateTime<Utc> = modified.into();
        if mtime < cutoff {
            trace!(path = %path.display(), "skipping log untouched since cutoff");
            return Vec::new();
        }
    }
    parse_file_since(path, Some(cutoff))
}

/// Local midnight of the day containing `now`, as a UTC instant.
pub fn start_of_today<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let midnight = now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default();
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        // No local midnight (DST gap at 00:00): fall back to the UTC reading of it
        .unwrap_or_else(|| midnight.and_utc())
}

/// Every entry since `cutoff` across the store. Files are parsed in parallel.
pub fn load_entries_since(store: &LogStore, cutoff: DateTime<Utc>) -> Vec<UsageEntry> {
    let files = store.find_log_files();
    let entries: Vec<UsageEntry> = files
        .par_iter()
        .flat_map_iter(|p| parse_todays_file(p, cutoff))
        .collect();
    debug!(
        files = files.len(),
        entries = entries.len(),
        cutoff = %cutoff,
        "loaded usage entries"
    );
    entries
}

/// Everything recorded under one session id.
#[derive(Debug, Clone)]
pub struct SessionUsage {
    pub total_cost: f64,
    pub entries: Vec<UsageEntry>,
}

/// Load all usage of `session_id` from its `<session_id>.jsonl` logs.
///
/// Repeated copies of one streamed response (same message and request id) are
/// counted once. Returns `None` when the session has no log or no usage.
pub fn load_session_usage(
    store: &LogStore,
    session_id: &str,
    mode: CostMode,
) -> Option<SessionUsage> {
    let files = store.find_session_files(session_id);
    if files.is_empty() {
        debug!(session_id, "no log file for session");
        return None;
    }
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries = Vec::new();
    let mut total_cost = 0.0;
    for path in &files {
        for e in parse_file(path) {
            if let Some(key) = e.dedup_key() {
                if !seen.insert(key) {
                    continue;
                }
            }
            total_cost += entry_cost(&e, mode);
            entries.push(e);
        }
    }
    if entries.is_empty() {
        return None;
    }
    Some(SessionUsage {
        total_cost,
        entries,
    })
}

/// Context window fill from the last assistant message with usage in a transcript.
pub fn calc_context_tokens(
    transcript_path: &Path,
    model_id: &str,
    model_display_name: &str,
) -> Option<ContextUsage> {
    // Stream line-by-line; transcripts can be large.
    let file = File::open(transcript_path).ok()?;
    let reader = BufReader::new(file);
    let mut last_input: Option<u64> = None;

    for line in reader.lines() {
        let Ok(line) = line else { continue };
        let t = line.trim();
        if t.is_empty() {
            continue;
        }
        let Ok(parsed) = serde_json::from_str::<LogLine>(t) else {
            continue;
        };
        if parsed.r#type.as_deref() != Some("assistant") {
            continue;
        }
        if let Some(usage) = parsed.message.and_then(|m| m.usage) {
            if usage.input_tokens.is_some() {
                last_input = Some(usage.prompt_tokens());
            }
        }
    }

    let input_tokens = last_input?;
    let context_limit = context_limit_for_model_display(model_id, model_display_name);
    let percentage = if context_limit == 0 {
        100
    } else {
        ((input_tokens as f64 / context_limit as f64) * 100.0).round() as u32
    };
    Some(ContextUsage {
        percentage: percentage.min(100),
        input_tokens,
        context_limit,
    })
}
