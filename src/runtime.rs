use anyhow::{Context, Result};
use std::future::Future;
use tokio::runtime::Builder;

/// Drive `fut` on a current-thread runtime and return without waiting for
/// blocking tasks that are still running. A timed-out `spawn_blocking` would
/// otherwise keep the process alive until it finishes.
pub fn run_detached<F: Future>(fut: F) -> Result<F::Output> {
    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    let out = rt.block_on(fut);
    rt.shutdown_background();
    Ok(out)
}
