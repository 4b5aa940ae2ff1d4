use anyhow::Result;
use chrono::Utc;
use std::process::ExitCode;
use tokio::task;

use claude_status_line::cli::SessionTimeArgs;
use claude_status_line::logging;
use claude_status_line::models::ActiveSession;
use claude_status_line::monitor::{run_countdown, time_left_line};
use claude_status_line::runtime;
use claude_status_line::store::LogStore;
use claude_status_line::utils::claude_paths;
use claude_status_line::window::active_session;

async fn find_session(args: &SessionTimeArgs) -> Result<Option<ActiveSession>> {
    let store = LogStore::from_claude_dirs(&claude_paths(args.claude_config_dir.as_deref()));
    let session = task::spawn_blocking(move || active_session(&store, Utc::now())).await?;
    Ok(session)
}

async fn run(args: SessionTimeArgs) -> Result<()> {
    let Some(session) = find_session(&args).await? else {
        // Nothing at all in statusline mode so the host line stays clean
        if !args.statusline {
            println!("No active session");
        }
        return Ok(());
    };

    if args.statusline {
        println!("{}", time_left_line(&session, Utc::now()));
        return Ok(());
    }
    run_countdown(session).await
}

fn main() -> ExitCode {
    let args = SessionTimeArgs::parse();
    logging::init(args.debug);

    match runtime::run_detached(run(args)).and_then(|r| r) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
