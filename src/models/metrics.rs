/// Token and cost totals for one session id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionMetrics {
    pub total_cost: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    /// Distinct models in first-seen order
    pub models_used: Vec<String>,
}

/// Context window fill derived from the latest assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextUsage {
    pub percentage: u32,
    pub input_tokens: u64,
    pub context_limit: u64,
}
