pub mod block;
pub mod entry;
pub mod git;
pub mod hook;
pub mod message;
pub mod metrics;

pub use block::{ActiveSession, SessionBlock, TokenCounts};
pub use entry::{UNKNOWN, UsageEntry};
pub use git::GitInfo;
pub use hook::HookJson;
pub use message::{LogLine, MessageUsage};
pub use metrics::{ContextUsage, SessionMetrics};
