use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Token counter that never rejects the line: negatives and non-numbers become 0,
/// fractions are truncated.
fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.map(|v| {
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0)
    }))
}

#[derive(Deserialize, Debug, Default)]
pub struct MessageUsage {
    #[serde(default, deserialize_with = "lenient_count")]
    pub input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub output_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub cache_read_input_tokens: Option<u64>,
}

impl MessageUsage {
    /// Prompt-side tokens: fresh input plus both cache counters
    pub fn prompt_tokens(&self) -> u64 {
        self.input_tokens.unwrap_or(0)
            + self.cache_creation_input_tokens.unwrap_or(0)
            + self.cache_read_input_tokens.unwrap_or(0)
    }
}

#[derive(Deserialize, Debug)]
pub struct MessageObj {
    pub id: Option<String>,
    pub model: Option<String>,
    pub usage: Option<MessageUsage>,
}

/// One line of a usage log or transcript. Unknown fields are ignored.
#[derive(Deserialize, Debug)]
pub struct LogLine {
    pub r#type: Option<String>,
    pub timestamp: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
    #[serde(rename = "costUSD")]
    pub cost_usd: Option<f64>,
    pub message: Option<MessageObj>,
}
