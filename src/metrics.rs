//! Per-session token totals and model list.

use tracing::debug;

use crate::models::{SessionMetrics, UsageEntry};
use crate::pricing::CostMode;
use crate::store::LogStore;
use crate::usage::{SessionUsage, load_session_usage};

/// Fold a session's entries into totals.
///
/// Entries are visited chronologically (ties broken by model id), so the
/// first-seen order of `models_used` does not depend on input order.
pub fn aggregate_session(usage: &SessionUsage) -> SessionMetrics {
    let mut ordered: Vec<&UsageEntry> = usage.entries.iter().collect();
    ordered.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.model.cmp(&b.model))
    });

    let mut m = SessionMetrics {
        total_cost: usage.total_cost,
        ..Default::default()
    };
    for e in ordered {
        m.input_tokens += e.input_tokens;
        m.output_tokens += e.output_tokens;
        m.cache_creation_tokens += e.cache_creation_tokens;
        m.cache_read_tokens += e.cache_read_tokens;
        if !m.models_used.iter().any(|x| x == &e.model) {
            m.models_used.push(e.model.clone());
        }
    }
    m
}

/// Load and aggregate one session. `None` means the session has no recorded usage.
pub fn load_session_metrics(store: &LogStore, session_id: &str) -> Option<SessionMetrics> {
    let usage = load_session_usage(store, session_id, CostMode::Auto)?;
    let metrics = aggregate_session(&usage);
    debug!(
        session_id,
        cost = metrics.total_cost,
        models = ?metrics.models_used,
        "aggregated session metrics"
    );
    Some(metrics)
}
