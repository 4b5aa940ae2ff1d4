/// Status line for Claude Code: reads the hook JSON on stdin and prints one line
#[derive(clap::Parser, Debug)]
#[command(name = "claude-status-line", version, about)]
pub struct Args {
    /// Currency code for session cost display
    #[arg(short = 'c', long, default_value = "CAD")]
    pub currency: String,

    /// Force Claude data path(s), comma-separated. Defaults to ~/.claude and ~/.config/claude
    #[arg(long, env = "CLAUDE_CONFIG_DIR")]
    pub claude_config_dir: Option<String>,

    /// Debug mode: log collaborator details to stderr
    #[arg(long, env = "CLAUDE_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }
}

/// Time left in the current 5-hour Claude usage window
#[derive(clap::Parser, Debug)]
#[command(name = "claude-session-time", version, about)]
pub struct SessionTimeArgs {
    /// Print the time left once (e.g. "2h 30m left") instead of a live countdown
    #[arg(long)]
    pub statusline: bool,

    /// Force Claude data path(s), comma-separated. Defaults to ~/.claude and ~/.config/claude
    #[arg(long, env = "CLAUDE_CONFIG_DIR")]
    pub claude_config_dir: Option<String>,

    /// Debug mode: log scan details to stderr
    #[arg(long, env = "CLAUDE_DEBUG")]
    pub debug: bool,
}

impl SessionTimeArgs {
    pub fn parse() -> Self {
        <SessionTimeArgs as clap::Parser>::parse()
    }
}
