use chrono::TimeDelta;
use std::env;

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn red(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn yellow(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn green(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
}

#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

use crate::models::{ContextUsage, GitInfo, HookJson, SessionMetrics};
use crate::utils::{
    TimeLeftStyle, basename, cache_efficiency, format_compact_number, format_duration,
    format_time_left, shorten_model_name,
};

/// Clear the terminal and home the cursor
pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[0f";

pub const SEPARATOR: &str = " | ";

/// Everything the status line can show besides the hook input itself.
/// `None` fields are simply left out.
#[derive(Debug, Default)]
pub struct StatusParts {
    /// Already converted and formatted session cost
    pub cost: Option<String>,
    pub metrics: Option<SessionMetrics>,
    pub context: Option<ContextUsage>,
    /// Remaining time of the active window
    pub time_left: Option<TimeDelta>,
    pub git: Option<GitInfo>,
}

fn model_label(hook: &HookJson) -> String {
    let display = hook.model.display_name.trim();
    if display.is_empty() {
        shorten_model_name(&hook.model.id)
    } else {
        display.to_string()
    }
}

fn tokens_segment(m: &SessionMetrics) -> String {
    let prompt = m.input_tokens + m.cache_creation_tokens + m.cache_read_tokens;
    format!(
        "🪙 {} in · {} out · {}% cached",
        format_compact_number(prompt),
        format_compact_number(m.output_tokens),
        cache_efficiency(m.cache_read_tokens, m.input_tokens)
    )
}

/// Ordered status line segments
pub fn status_components(hook: &HookJson, parts: &StatusParts) -> Vec<String> {
    let mut components = Vec::new();
    let current_dir = hook.workspace.current_dir.as_str();

    if let Some(project_dir) = hook.workspace.project_dir.as_deref()
        && !project_dir.is_empty()
        && project_dir != current_dir
    {
        components.push(format!("📁 {}", basename(project_dir)));
    }

    components.push(format!("🤖 {}", model_label(hook)));

    if let Some(cost) = &parts.cost {
        components.push(format!("💰 {cost} session"));
    }
    if let Some(m) = &parts.metrics {
        components.push(tokens_segment(m));
    }

    let pct = parts.context.map(|c| c.percentage).unwrap_or(0);
    components.push(format!("📈 {pct}%"));

    if let Some(left) = parts.time_left {
        components.push(format!(
            "⏳ {}",
            format_time_left(left.num_milliseconds(), TimeLeftStyle::Compact)
        ));
    }

    if let Some(c) = &hook.cost {
        if let Some(ms) = c.total_duration_ms.filter(|ms| *ms > 0) {
            components.push(format!("⏱️ {}", format_duration(ms)));
        }
        let added = c.total_lines_added.unwrap_or(0);
        let removed = c.total_lines_removed.unwrap_or(0);
        if added != 0 || removed != 0 {
            components.push(format!("✏️ +{added} -{removed}"));
        }
    }

    let dir_name = if current_dir.is_empty() {
        "~".to_string()
    } else {
        basename(current_dir)
    };
    components.push(format!("📂 {dir_name}"));

    if let Some(git) = &parts.git {
        components.push(format!("🌿 {}", git.branch));
    }

    components
}

pub fn build_status_line(hook: &HookJson, parts: &StatusParts) -> String {
    status_components(hook, parts).join(SEPARATOR)
}

/// Urgency of the live countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownColor {
    Green,
    Yellow,
    Red,
}

pub fn countdown_color(remaining: TimeDelta) -> CountdownColor {
    if remaining < TimeDelta::minutes(30) {
        CountdownColor::Red
    } else if remaining < TimeDelta::hours(1) {
        CountdownColor::Yellow
    } else {
        CountdownColor::Green
    }
}

/// Respect NO_COLOR if set
pub fn colors_enabled() -> bool {
    env::var_os("NO_COLOR").is_none()
}

/// One frame of the countdown: `HH:MM:SS`, colored by urgency when `color` is set
pub fn render_countdown(remaining: TimeDelta, color: bool) -> String {
    let text = format_time_left(remaining.num_milliseconds(), TimeLeftStyle::Clock);
    if !color {
        return text;
    }
    match countdown_color(remaining) {
        CountdownColor::Red => text.red().to_string(),
        CountdownColor::Yellow => text.yellow().to_string(),
        CountdownColor::Green => text.green().to_string(),
    }
}
