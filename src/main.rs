use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio::task;
use tracing::debug;

use claude_status_line::cli::Args;
use claude_status_line::currency::format_currency;
use claude_status_line::display::{StatusParts, build_status_line};
use claude_status_line::logging;
use claude_status_line::metrics::load_session_metrics;
use claude_status_line::models::{GitInfo, HookJson};
use claude_status_line::runtime;
use claude_status_line::store::LogStore;
use claude_status_line::usage::calc_context_tokens;
use claude_status_line::utils::{claude_paths, read_stdin};
use claude_status_line::window::{active_session, remaining_time};

const GIT_TIMEOUT: Duration = Duration::from_secs(2);

#[cfg(feature = "git")]
fn lookup_git(dir: PathBuf) -> Option<GitInfo> {
    claude_status_line::git::read_git_info(&dir)
}

#[cfg(not(feature = "git"))]
fn lookup_git(_dir: PathBuf) -> Option<GitInfo> {
    None
}

/// A collaborator that failed or panicked contributes nothing
fn settle<T>(label: &str, joined: Result<Option<T>, task::JoinError>) -> Option<T> {
    match joined {
        Ok(v) => v,
        Err(e) => {
            debug!(task = label, error = %e, "collaborator task failed");
            None
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let stdin = read_stdin().context("read stdin")?;
    if stdin.iter().all(u8::is_ascii_whitespace) {
        bail!("no hook JSON on stdin");
    }
    let hook: HookJson = serde_json::from_slice(&stdin).context("parse hook json")?;

    let store = LogStore::from_claude_dirs(&claude_paths(args.claude_config_dir.as_deref()));
    debug!(roots = ?store.roots(), session_id = %hook.session_id, "resolved log roots");

    let metrics_task = {
        let store = store.clone();
        let session_id = hook.session_id.clone();
        task::spawn_blocking(move || load_session_metrics(&store, &session_id))
    };
    let context_task = {
        let transcript = PathBuf::from(&hook.transcript_path);
        let model_id = hook.model.id.clone();
        let display_name = hook.model.display_name.clone();
        task::spawn_blocking(move || calc_context_tokens(&transcript, &model_id, &display_name))
    };
    let window_task = {
        let store = store.clone();
        task::spawn_blocking(move || active_session(&store, Utc::now()))
    };
    let git_task = {
        let dir = Path::new(&hook.workspace.current_dir).to_path_buf();
        tokio::time::timeout(GIT_TIMEOUT, task::spawn_blocking(move || lookup_git(dir)))
    };

    let (metrics, context, window, git) =
        tokio::join!(metrics_task, context_task, window_task, git_task);

    let metrics = settle("metrics", metrics);
    let context = settle("context", context);
    let window = settle("window", window);
    let git = match git {
        Ok(joined) => settle("git", joined),
        Err(_) => {
            debug!("git lookup timed out");
            None
        }
    };

    let cost = match &metrics {
        Some(m) => {
            let usd = m.total_cost;
            let currency = args.currency.clone();
            let formatted = task::spawn_blocking(move || format_currency(usd, &currency)).await;
            Some(formatted.unwrap_or_else(|_| format!("${usd:.2} USD")))
        }
        None => None,
    };

    let parts = StatusParts {
        cost,
        metrics,
        context,
        time_left: window.map(|s| remaining_time(s.start, Utc::now())),
        git,
    };
    println!("{}", build_status_line(&hook, &parts));
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.debug);

    match runtime::run_detached(run(args)).and_then(|r| r) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
