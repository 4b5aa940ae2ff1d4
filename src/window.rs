//! # Window Module
//!
//! Groups usage entries into 5-hour session blocks and resolves the one that
//! is still running.
//!
//! A block is anchored at the hour-floor of its first entry. It ends once an
//! entry arrives more than five hours after the anchor, or more than five
//! hours after the previous entry, whichever happens first.

use chrono::{DateTime, Local, TimeDelta, TimeZone, Timelike, Utc};
use tracing::debug;

use crate::models::{ActiveSession, SessionBlock, TokenCounts, UsageEntry};
use crate::store::LogStore;
use crate::usage::{load_entries_since, start_of_today};
use crate::utils::WINDOW_DURATION_HOURS;

/// Length of one usage window
pub const SESSION_DURATION: TimeDelta = TimeDelta::hours(WINDOW_DURATION_HOURS);

/// Truncate `t` to the start of its hour in its own time zone.
///
/// Minutes, seconds and sub-seconds are zeroed; hour, date and offset are kept.
pub fn hour_floor<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    t.with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_minute(0))
        // Only unrepresentable on a DST fold; fall back to dropping the seconds part
        .unwrap_or_else(|| {
            t.clone()
                - TimeDelta::seconds(i64::from(t.minute() * 60 + t.second()))
                - TimeDelta::nanoseconds(i64::from(t.nanosecond()))
        })
}

fn block_anchor<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    hour_floor(&ts.with_timezone(tz)).with_timezone(&Utc)
}

fn close_block(start: DateTime<Utc>, entries: Vec<UsageEntry>, is_active: bool) -> SessionBlock {
    let mut tokens = TokenCounts::default();
    for e in &entries {
        tokens.add(e);
    }
    let end = entries.last().map(|e| e.timestamp).unwrap_or(start);
    SessionBlock {
        start,
        end,
        is_active,
        entries,
        tokens,
    }
}

/// Partition `entries` into chronological session blocks.
///
/// Block starts are hour-floored in `tz`. Only the final block may be active:
/// it is when both its last entry and its start lie less than
/// [`SESSION_DURATION`] before `now`.
pub fn identify_session_blocks<Tz: TimeZone>(
    entries: &[UsageEntry],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<SessionBlock> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| e.timestamp);

    let mut blocks = Vec::new();
    let mut current: Option<(DateTime<Utc>, Vec<UsageEntry>)> = None;

    for entry in sorted {
        let ts = entry.timestamp;
        if let Some((start, block_entries)) = current.as_mut() {
            let last_ts = block_entries.last().map(|e| e.timestamp).unwrap_or(*start);
            if ts - *start <= SESSION_DURATION && ts - last_ts <= SESSION_DURATION {
                block_entries.push(entry);
                continue;
            }
        }
        if let Some((start, finished)) = current.take() {
            blocks.push(close_block(start, finished, false));
        }
        current = Some((block_anchor(ts, tz), vec![entry]));
    }

    if let Some((start, block_entries)) = current {
        let last_ts = block_entries.last().map(|e| e.timestamp).unwrap_or(start);
        let is_active = now - last_ts < SESSION_DURATION && now - start < SESSION_DURATION;
        blocks.push(close_block(start, block_entries, is_active));
    }

    blocks
}

/// The active block, if any. Only the last block can be active.
pub fn find_active_block(blocks: &[SessionBlock]) -> Option<&SessionBlock> {
    blocks.iter().rev().find(|b| b.is_active)
}

/// Active session derived from today's entries.
pub fn active_session_from_entries<Tz: TimeZone>(
    entries: &[UsageEntry],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Option<ActiveSession> {
    if entries.is_empty() {
        return None;
    }
    let blocks = identify_session_blocks(entries, now, tz);
    debug!(blocks = blocks.len(), "reconstructed session blocks");
    find_active_block(&blocks).map(|b| ActiveSession {
        start: b.start,
        last_activity: b.end,
    })
}

/// Scan the store for today's usage and return the running session, if one exists.
///
/// "No log files", "no usage today" and "no open block" all yield `None`.
pub fn active_session(store: &LogStore, now: DateTime<Utc>) -> Option<ActiveSession> {
    let local_now = now.with_timezone(&Local);
    let entries = load_entries_since(store, start_of_today(&local_now));
    active_session_from_entries(&entries, now, &Local)
}

/// Time left in a window that opened at `start`, never negative.
pub fn remaining_time(start: DateTime<Utc>, now: DateTime<Utc>) -> TimeDelta {
    let elapsed = now - start;
    (SESSION_DURATION - elapsed).max(TimeDelta::zero())
}
