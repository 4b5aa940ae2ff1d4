//! # Pricing Module
//!
//! Per-model token prices used to cost log lines that carry no `costUSD`.
//!
//! Cache writes are billed at 1.25x the input price and cache reads at 0.1x.
//! All four prices can be overridden together via environment variables:
//! - `CLAUDE_PRICE_INPUT`
//! - `CLAUDE_PRICE_OUTPUT`
//! - `CLAUDE_PRICE_CACHE_CREATE`
//! - `CLAUDE_PRICE_CACHE_READ`

use std::env;

use crate::models::UsageEntry;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pricing {
    pub in_per_tok: f64,
    pub out_per_tok: f64,
    pub cache_create_per_tok: f64,
    pub cache_read_per_tok: f64,
}

impl Pricing {
    /// Prices from USD per million input/output tokens
    fn per_million(input: f64, output: f64) -> Self {
        let in_pt = input / 1e6;
        Pricing {
            in_per_tok: in_pt,
            out_per_tok: output / 1e6,
            cache_create_per_tok: in_pt * 1.25,
            cache_read_per_tok: in_pt * 0.1,
        }
    }

    pub fn cost(&self, e: &UsageEntry) -> f64 {
        (e.input_tokens as f64) * self.in_per_tok
            + (e.output_tokens as f64) * self.out_per_tok
            + (e.cache_creation_tokens as f64) * self.cache_create_per_tok
            + (e.cache_read_tokens as f64) * self.cache_read_per_tok
    }
}

/// How the cost of a single entry is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostMode {
    /// Use `costUSD` when present, otherwise price the tokens
    #[default]
    Auto,
    /// Always price the tokens
    Calculate,
    /// Only trust `costUSD`; entries without it cost nothing
    Display,
}

// Known variants first: "opus-4-5" must win over the "opus-4" prefix.
const KNOWN_MODELS: &[(&str, f64, f64)] = &[
    ("opus-4-5", 5.0, 25.0),
    ("opus-4-1", 15.0, 75.0),
    ("opus-4", 15.0, 75.0),
    ("4-opus", 15.0, 75.0),
    ("sonnet-4", 3.0, 15.0),
    ("4-sonnet", 3.0, 15.0),
    ("3-7-sonnet", 3.0, 15.0),
    ("3-5-sonnet", 3.0, 15.0),
    ("haiku-4-5", 1.0, 5.0),
    ("3-5-haiku", 0.8, 4.0),
    ("3-haiku", 0.25, 1.25),
];

pub(crate) fn static_pricing_lookup(model_id: &str) -> Option<Pricing> {
    let m = model_id.to_lowercase().replace('.', "-");
    KNOWN_MODELS
        .iter()
        .find(|(pat, _, _)| m.contains(pat))
        .map(|&(_, i, o)| Pricing::per_million(i, o))
}

fn env_override() -> Option<Pricing> {
    let read = |k: &str| env::var(k).ok()?.trim().parse::<f64>().ok();
    Some(Pricing {
        in_per_tok: read("CLAUDE_PRICE_INPUT")?,
        out_per_tok: read("CLAUDE_PRICE_OUTPUT")?,
        cache_create_per_tok: read("CLAUDE_PRICE_CACHE_CREATE")?,
        cache_read_per_tok: read("CLAUDE_PRICE_CACHE_READ")?,
    })
}

pub fn pricing_for_model(model_id: &str) -> Option<Pricing> {
    if let Some(p) = env_override() {
        return Some(p);
    }
    if let Some(p) = static_pricing_lookup(model_id) {
        return Some(p);
    }
    // Family heuristics for ids we have not seen yet
    let m = model_id.to_lowercase();
    if m.contains("opus") {
        Some(Pricing::per_million(15.0, 75.0))
    } else if m.contains("sonnet") {
        Some(Pricing::per_million(3.0, 15.0))
    } else if m.contains("haiku") {
        Some(Pricing::per_million(0.8, 4.0))
    } else {
        None
    }
}

/// Cost of one entry in USD under `mode`. Unpriced models cost nothing.
pub fn entry_cost(e: &UsageEntry, mode: CostMode) -> f64 {
    let calculated = || pricing_for_model(&e.model).map(|p| p.cost(e)).unwrap_or(0.0);
    match mode {
        CostMode::Auto => e.cost_usd.unwrap_or_else(calculated),
        CostMode::Calculate => calculated(),
        CostMode::Display => e.cost_usd.unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_pricing_for_known_models() {
        let sonnet = pricing_for_model("claude-3.5-sonnet").unwrap();
        assert!(approx(sonnet.in_per_tok, 3e-6));
        assert!(approx(sonnet.out_per_tok, 15e-6));
        assert!(approx(sonnet.cache_create_per_tok, 3.75e-6));
        assert!(approx(sonnet.cache_read_per_tok, 0.3e-6));

        let opus = pricing_for_model("claude-opus-4-20250514").unwrap();
        assert!(approx(opus.in_per_tok, 15e-6));
        assert!(approx(opus.out_per_tok, 75e-6));

        let opus45 = pricing_for_model("claude-opus-4-5-20251101").unwrap();
        assert!(approx(opus45.in_per_tok, 5e-6));
        assert!(approx(opus45.out_per_tok, 25e-6));

        let haiku = pricing_for_model("claude-3-5-haiku-20241022").unwrap();
        assert!(approx(haiku.in_per_tok, 0.8e-6));
    }

    #[test]
    fn test_pricing_family_fallback() {
        let opus = pricing_for_model("some-future-opus-model").unwrap();
        assert!(approx(opus.in_per_tok, 15e-6));
        let sonnet = pricing_for_model("some-future-sonnet-model").unwrap();
        assert!(approx(sonnet.out_per_tok, 15e-6));
    }

    #[test]
    fn test_unknown_model() {
        assert!(pricing_for_model("unknown-model").is_none());
    }

    #[test]
    fn cost_modes() {
        let mut e = UsageEntry::new(Utc::now());
        e.model = "claude-sonnet-4-20250514".into();
        e.input_tokens = 1_000_000;
        e.output_tokens = 100_000;

        assert!(approx(entry_cost(&e, CostMode::Calculate), 4.5));
        assert!(approx(entry_cost(&e, CostMode::Auto), 4.5));
        assert_eq!(entry_cost(&e, CostMode::Display), 0.0);

        e.cost_usd = Some(1.25);
        assert!(approx(entry_cost(&e, CostMode::Auto), 1.25));
        assert!(approx(entry_cost(&e, CostMode::Display), 1.25));
        assert!(approx(entry_cost(&e, CostMode::Calculate), 4.5));
    }
}
