use chrono::{DateTime, Local, SecondsFormat, TimeDelta, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use claude_status_line::currency::format_amount;
use claude_status_line::display::{StatusParts, build_status_line};
use claude_status_line::metrics::{aggregate_session, load_session_metrics};
use claude_status_line::models::GitInfo;
use claude_status_line::models::hook::{HookJson, HookModel, HookWorkspace};
use claude_status_line::store::LogStore;
use claude_status_line::usage::{
    SessionUsage, calc_context_tokens, load_entries_since, load_session_usage, start_of_today,
};
use claude_status_line::pricing::CostMode;
use claude_status_line::window::{active_session, active_session_from_entries};

fn log_line(ts: DateTime<Utc>, session: &str, model: &str, msg: &str, input: u64) -> String {
    format!(
        r#"{{"type":"assistant","timestamp":"{}","sessionId":"{session}","requestId":"req-{msg}","costUSD":0.25,"message":{{"id":"{msg}","model":"{model}","usage":{{"input_tokens":{input},"output_tokens":10,"cache_creation_input_tokens":0,"cache_read_input_tokens":{}}}}}}}"#,
        ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        input * 9
    )
}

fn write_log(root: &Path, rel: &str, lines: &[String]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, h, m, 0).unwrap()
}

#[test]
fn malformed_lines_are_skipped_across_the_store() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("projects");
    write_log(
        &root,
        "proj-a/s1.jsonl",
        &[
            log_line(at(9, 15), "s1", "claude-sonnet-4-20250514", "m1", 100),
            "{not json".to_string(),
            log_line(at(9, 40), "s1", "claude-sonnet-4-20250514", "m2", 100),
        ],
    );
    write_log(
        &root,
        "proj-b/nested/s2.jsonl",
        &[log_line(at(14, 30), "s2", "claude-opus-4-5-20251101", "m3", 100)],
    );
    fs::write(root.join("proj-b/notes.txt"), "not a log").unwrap();

    let store = LogStore::new(vec![root, tmp.path().join("missing")]);
    assert_eq!(store.find_log_files().len(), 2);

    let entries = load_entries_since(&store, at(0, 0));
    assert_eq!(entries.len(), 3);

    let active = active_session_from_entries(&entries, at(14, 45), &Utc).unwrap();
    assert_eq!(active.start, at(14, 0));
    assert_eq!(active.last_activity, at(14, 30));
}

#[test]
fn active_session_from_fresh_logs() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("projects");
    // Half past local midnight keeps the entry on the same day as the file mtime
    let now = start_of_today(&Local::now()) + TimeDelta::minutes(30);
    write_log(
        &root,
        "proj/live.jsonl",
        &[log_line(now - TimeDelta::seconds(2), "live", "claude-sonnet-4", "m1", 5)],
    );
    let store = LogStore::new(vec![root]);

    let session = active_session(&store, now).unwrap();
    assert!(session.start <= now);
    assert!(now - session.start < TimeDelta::hours(1));

    let empty = LogStore::new(vec![tmp.path().join("nothing-here")]);
    assert!(active_session(&empty, now).is_none());
}

#[test]
fn metrics_do_not_depend_on_entry_order() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("projects");
    write_log(
        &root,
        "proj/s1.jsonl",
        &[
            log_line(at(10, 5), "s1", "claude-opus-4-5-20251101", "m2", 20),
            log_line(at(10, 0), "s1", "claude-sonnet-4-20250514", "m1", 10),
            log_line(at(10, 5), "s1", "claude-haiku-4-5", "m3", 30),
        ],
    );
    let store = LogStore::new(vec![root]);
    let usage = load_session_usage(&store, "s1", CostMode::Auto).unwrap();

    let forward = aggregate_session(&usage);
    let mut reversed_entries = usage.entries.clone();
    reversed_entries.reverse();
    let reversed = aggregate_session(&SessionUsage {
        total_cost: usage.total_cost,
        entries: reversed_entries,
    });

    assert_eq!(forward, reversed);
    assert_eq!(forward.input_tokens, 60);
    assert_eq!(forward.cache_read_tokens, 540);
    assert_eq!(
        forward.models_used,
        vec![
            "claude-sonnet-4-20250514".to_string(),
            "claude-haiku-4-5".to_string(),
            "claude-opus-4-5-20251101".to_string(),
        ]
    );
}

#[test]
fn unknown_session_has_no_metrics() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("projects");
    write_log(&root, "proj/s1.jsonl", &[log_line(at(10, 0), "s1", "m", "m1", 1)]);
    let store = LogStore::new(vec![root]);
    assert!(load_session_metrics(&store, "nope").is_none());
}

#[test]
fn status_line_from_fixture() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("projects");
    let transcript = write_log(
        &root,
        "proj/s1.jsonl",
        &[
            log_line(at(10, 0), "s1", "claude-sonnet-4-20250514", "m1", 1000),
            log_line(at(10, 1), "s1", "claude-sonnet-4-20250514", "m1", 1000),
            log_line(at(10, 2), "s1", "claude-sonnet-4-20250514", "m2", 2000),
        ],
    );
    let store = LogStore::new(vec![root]);

    let hook = HookJson {
        session_id: "s1".to_string(),
        transcript_path: transcript.to_string_lossy().into_owned(),
        model: HookModel {
            id: "claude-sonnet-4-20250514".to_string(),
            display_name: "Sonnet 4".to_string(),
        },
        workspace: HookWorkspace {
            current_dir: "/work/app".to_string(),
            project_dir: Some("/work/app".to_string()),
        },
        cost: None,
    };

    let metrics = load_session_metrics(&store, "s1").unwrap();
    // m1 was logged twice with the same request id
    assert!((metrics.total_cost - 0.5).abs() < 1e-9);

    let context = calc_context_tokens(&transcript, &hook.model.id, "Sonnet 4").unwrap();
    assert_eq!(context.input_tokens, 20_000);
    assert_eq!(context.percentage, 10);

    let parts = StatusParts {
        cost: Some(format_amount(metrics.total_cost, Some(2.0))),
        metrics: Some(metrics),
        context: Some(context),
        time_left: None,
        git: Some(GitInfo {
            branch: "main".to_string(),
        }),
    };
    assert_eq!(
        build_status_line(&hook, &parts),
        "🤖 Sonnet 4 | 💰 $1.00 session | 🪙 30K in · 20 out · 90% cached | 📈 10% | 📂 app | 🌿 main"
    );
}
