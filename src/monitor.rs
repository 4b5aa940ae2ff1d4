//! Live countdown for the active usage window.

use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use std::io::Write;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::display::{CLEAR_SCREEN, colors_enabled, render_countdown};
use crate::models::ActiveSession;
use crate::utils::{TimeLeftStyle, format_time_left};
use crate::window::remaining_time;

const TICK: Duration = Duration::from_secs(1);

/// One redraw of the countdown screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownFrame {
    pub text: String,
    pub expired: bool,
}

pub fn countdown_frame(start: DateTime<Utc>, now: DateTime<Utc>, color: bool) -> CountdownFrame {
    let remaining = remaining_time(start, now);
    CountdownFrame {
        text: render_countdown(remaining, color),
        expired: remaining <= TimeDelta::zero(),
    }
}

/// Single-shot `2h 30m left` text for embedding in another status line
pub fn time_left_line(session: &ActiveSession, now: DateTime<Utc>) -> String {
    let remaining = remaining_time(session.start, now);
    format_time_left(remaining.num_milliseconds(), TimeLeftStyle::Compact)
}

/// Redraw the countdown every second until the window runs out or Ctrl+C.
pub async fn run_countdown(session: ActiveSession) -> Result<()> {
    let color = colors_enabled();
    let mut interval = time::interval(TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut out = std::io::stdout();
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("countdown interrupted");
                write!(out, "{CLEAR_SCREEN}")?;
                out.flush()?;
                return Ok(());
            }
            _ = interval.tick() => {
                let frame = countdown_frame(session.start, Utc::now(), color);
                write!(out, "{CLEAR_SCREEN}")?;
                writeln!(out, "{}", frame.text)?;
                if frame.expired {
                    writeln!(out, "\nSession expired")?;
                    out.flush()?;
                    return Ok(());
                }
                out.flush()?;
            }
        }
    }
}
