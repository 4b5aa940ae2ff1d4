use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct HookModel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Deserialize, Debug)]
pub struct HookWorkspace {
    #[serde(default)]
    pub current_dir: String,
    pub project_dir: Option<String>,
}

/// Optional cost summary provided by Claude Code's statusLine input.
/// Only the fields shown on the line are read; the rest are ignored.
#[derive(Deserialize, Debug, Default)]
pub struct HookCost {
    pub total_duration_ms: Option<u64>,
    pub total_lines_added: Option<i64>,
    pub total_lines_removed: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct HookJson {
    pub session_id: String,
    pub transcript_path: String,
    pub model: HookModel,
    pub workspace: HookWorkspace,
    /// Optional aggregate cost fields from Claude Code
    pub cost: Option<HookCost>,
}
