use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const WINDOW_DURATION_HOURS: i64 = 5;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

static MODEL_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(\d{1,2})(?:-(\d{1,2}))?-)?(opus|sonnet|haiku)(?:-(\d{1,2}))?(?:-(\d{1,2}))?(?:\D|$)")
        .expect("model name pattern")
});

pub fn claude_paths(override_env: Option<&str>) -> Vec<PathBuf> {
    let mut paths = vec![];
    if let Some(list) = override_env {
        let list = list.trim();
        if !list.is_empty() {
            for p in list.split(',') {
                let p = p.trim();
                if p.is_empty() {
                    continue;
                }
                let pb = PathBuf::from(p);
                if pb.join("projects").is_dir() {
                    paths.push(pb);
                }
            }
            if !paths.is_empty() {
                return paths;
            }
        }
    }
    let basedirs = directories::BaseDirs::new();
    let home = basedirs
        .as_ref()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~"));
    // ~/.claude first, then the legacy ~/.config/claude
    for base in [home.join(".claude"), home.join(".config").join("claude")] {
        if base.join("projects").is_dir() {
            paths.push(base);
        }
    }
    paths
}

pub fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;
    Ok(buf)
}

/// Last path component, or the whole string when there is none
pub fn basename(p: &str) -> String {
    Path::new(p)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.to_string())
}

/// How `format_time_left` renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLeftStyle {
    /// `2h 30m left`, for the status line
    Compact,
    /// `HH:MM:SS`, for the live countdown
    Clock,
}

/// Render a remaining duration. Each unit is floored; zero or negative input
/// means the window is over.
pub fn format_time_left(ms: i64, style: TimeLeftStyle) -> String {
    if ms <= 0 {
        return match style {
            TimeLeftStyle::Compact => "No time left".to_string(),
            TimeLeftStyle::Clock => "00:00:00".to_string(),
        };
    }
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    match style {
        TimeLeftStyle::Compact if hours > 0 => format!("{hours}h {minutes}m left"),
        TimeLeftStyle::Compact if minutes > 0 => format!("{minutes}m left"),
        TimeLeftStyle::Compact => format!("{seconds}s left"),
        TimeLeftStyle::Clock => format!("{hours:02}:{minutes:02}:{seconds:02}"),
    }
}

/// `1.2K`, `45K`, `3.4M`; one decimal only below ten units
pub fn format_compact_number(n: u64) -> String {
    let scaled = |v: f64, suffix: &str| {
        if v >= 10.0 {
            format!("{v:.0}{suffix}")
        } else {
            format!("{v:.1}{suffix}")
        }
    };
    if n >= 1_000_000 {
        scaled(n as f64 / 1e6, "M")
    } else if n >= 1_000 {
        scaled(n as f64 / 1e3, "K")
    } else {
        n.to_string()
    }
}

/// `1h 23m`, `2h`, `45m`, `30s`
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    if hours > 0 {
        let rem = minutes % 60;
        if rem > 0 {
            format!("{hours}h {rem}m")
        } else {
            format!("{hours}h")
        }
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}

/// Share of prompt tokens served from cache, 0-100
pub fn cache_efficiency(cache_read_tokens: u64, input_tokens: u64) -> u32 {
    let total = cache_read_tokens + input_tokens;
    if total == 0 {
        return 0;
    }
    ((cache_read_tokens as f64 / total as f64) * 100.0).round() as u32
}

/// `claude-opus-4-5-20251101` → `Opus 4.5`; ids outside the known families pass through.
pub fn shorten_model_name(model_id: &str) -> String {
    let Some(caps) = MODEL_NAME_RE.captures(model_id) else {
        return model_id.to_string();
    };
    // (?i) folds Unicode case, so the family may start with a multi-byte char
    let mut chars = caps[3].chars();
    let mut name: String = chars.next().map(|c| c.to_uppercase().collect()).unwrap_or_default();
    name.push_str(&chars.as_str().to_lowercase());
    let (major, minor) = if caps.get(4).is_some() {
        (caps.get(4), caps.get(5))
    } else {
        (caps.get(1), caps.get(2))
    };
    match (major, minor) {
        (Some(a), Some(b)) => name.push_str(&format!(" {}.{}", a.as_str(), b.as_str())),
        (Some(a), None) => name.push_str(&format!(" {}", a.as_str())),
        _ => {}
    }
    name
}

fn parse_u64_env(var: &str) -> Option<u64> {
    env::var(var)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
}

// Context limit detection that mirrors Claude Code behavior:
// - "[1m]" in the display name, or a 1M context mention, means 1,000,000 tokens
// - everything else is 200,000
// - CLAUDE_CONTEXT_LIMIT, if set, always wins
pub fn context_limit_for_model_display(model_id: &str, display_name: &str) -> u64 {
    if let Some(v) = parse_u64_env("CLAUDE_CONTEXT_LIMIT") {
        return v;
    }
    let dn_l = display_name.to_lowercase();
    let mid_l = model_id.to_lowercase();
    if dn_l.contains("[1m]")
        || (dn_l.contains("1m") && dn_l.contains("context"))
        || mid_l.contains("-1m")
        || mid_l.ends_with("[1m]")
    {
        return 1_000_000;
    }
    200_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn time_left_zero_and_negative() {
        for ms in [0, -1, -5_000_000] {
            assert_eq!(format_time_left(ms, TimeLeftStyle::Clock), "00:00:00");
            assert_eq!(format_time_left(ms, TimeLeftStyle::Compact), "No time left");
        }
    }

    #[test]
    fn time_left_styles() {
        assert_eq!(format_time_left(5_400_000, TimeLeftStyle::Compact), "1h 30m left");
        assert_eq!(format_time_left(5_400_000, TimeLeftStyle::Clock), "01:30:00");
        assert_eq!(format_time_left(125_999, TimeLeftStyle::Compact), "2m left");
        assert_eq!(format_time_left(59_999, TimeLeftStyle::Compact), "59s left");
        assert_eq!(format_time_left(999, TimeLeftStyle::Compact), "0s left");
        assert_eq!(format_time_left(3_723_999, TimeLeftStyle::Clock), "01:02:03");
        assert_eq!(format_time_left(3_600_000, TimeLeftStyle::Compact), "1h 0m left");
    }

    #[test]
    fn compact_numbers() {
        assert_eq!(format_compact_number(0), "0");
        assert_eq!(format_compact_number(999), "999");
        assert_eq!(format_compact_number(1_234), "1.2K");
        assert_eq!(format_compact_number(45_000), "45K");
        assert_eq!(format_compact_number(3_400_000), "3.4M");
        assert_eq!(format_compact_number(12_000_000), "12M");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(30_500), "30s");
        assert_eq!(format_duration(45 * 60_000), "45m");
        assert_eq!(format_duration(2 * 3_600_000), "2h");
        assert_eq!(format_duration(83 * 60_000 + 59_000), "1h 23m");
    }

    #[test]
    fn cache_share() {
        assert_eq!(cache_efficiency(0, 0), 0);
        assert_eq!(cache_efficiency(900, 100), 90);
        assert_eq!(cache_efficiency(1, 2), 33);
    }

    #[test]
    fn short_model_names() {
        assert_eq!(shorten_model_name("claude-opus-4-5-20251101"), "Opus 4.5");
        assert_eq!(shorten_model_name("claude-sonnet-4-20250514"), "Sonnet 4");
        assert_eq!(shorten_model_name("claude-3-5-haiku-20241022"), "Haiku 3.5");
        assert_eq!(shorten_model_name("claude-haiku-4-5"), "Haiku 4.5");
        assert_eq!(shorten_model_name("Claude-Sonnet"), "Sonnet");
        assert_eq!(shorten_model_name("gpt-4o"), "gpt-4o");
    }

    #[test]
    fn non_ascii_model_ids_do_not_panic() {
        // U+017F case-folds to 's'
        assert_eq!(shorten_model_name("claude-ſonnet-4"), "Sonnet 4");
        assert_eq!(shorten_model_name("claude-ÓPUS"), "claude-ÓPUS");
        assert_eq!(shorten_model_name("ħaiku-ſ"), "ħaiku-ſ");
    }

    #[test]
    fn basename_of_paths() {
        assert_eq!(basename("/home/me/project"), "project");
        assert_eq!(basename("/home/me/project/"), "project");
        assert_eq!(basename(""), "");
    }

    #[test]
    #[serial]
    fn test_context_limit_for_model_display() {
        assert_eq!(
            context_limit_for_model_display("claude-3.5-sonnet", "Claude 3.5 Sonnet"),
            200_000
        );
        assert_eq!(
            context_limit_for_model_display("claude-3.5-sonnet", "Claude 3.5 Sonnet [1m]"),
            1_000_000
        );

        // SAFETY: serial test, no concurrent env access
        unsafe { env::set_var("CLAUDE_CONTEXT_LIMIT", "123456") };
        assert_eq!(
            context_limit_for_model_display("claude-3.5-sonnet", "Claude 3.5 Sonnet"),
            123456
        );
        unsafe { env::remove_var("CLAUDE_CONTEXT_LIMIT") };
    }
}
