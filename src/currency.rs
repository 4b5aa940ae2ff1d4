//! USD to local currency conversion for the cost segment.
//!
//! Rates come from the fawazahmed0 currency API and are cached for an hour in
//! the SQLite store (see [`crate::db`]). Every failure degrades to showing the
//! amount in USD.

use chrono::Utc;
use std::env;
use std::time::Duration;
use tracing::{debug, trace};

use crate::db;

const RATES_ENDPOINT: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies/usd.min.json";
const RATE_TTL_SECONDS: i64 = 60 * 60;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

fn rates_endpoint() -> String {
    env::var("CLAUDE_CURRENCY_API_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| RATES_ENDPOINT.to_string())
}

/// Pull `usd.<code>` out of the rates document
fn rate_from_document(doc: &serde_json::Value, currency: &str) -> Option<f64> {
    doc.get("usd")?
        .get(currency.to_lowercase())?
        .as_f64()
        .filter(|r| *r > 0.0)
}

fn fetch_rate(currency: &str) -> Option<f64> {
    let agent = ureq::AgentBuilder::new()
        .timeout_read(REQUEST_TIMEOUT)
        .timeout_write(REQUEST_TIMEOUT)
        .build();

    let url = rates_endpoint();
    let response = match agent.get(&url).set("Accept", "application/json").call() {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "currency rate request failed");
            return None;
        }
    };
    if response.status() != 200 {
        return None;
    }

    let doc: serde_json::Value = response.into_json().ok()?;
    rate_from_document(&doc, currency)
}

fn cached_rate(currency: &str, now: i64) -> Option<f64> {
    match db::load_rate(currency) {
        Ok(Some(cached)) if now - cached.fetched_at < RATE_TTL_SECONDS => {
            trace!(currency, rate = cached.rate, "currency cache hit");
            Some(cached.rate)
        }
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "currency cache unavailable");
            None
        }
    }
}

/// Units of `currency` per USD, from the cache when fresh, else fetched.
pub fn conversion_rate(currency: &str) -> Option<f64> {
    if currency.eq_ignore_ascii_case("usd") {
        return Some(1.0);
    }
    if let Some(rate) = cached_rate(currency, Utc::now().timestamp()) {
        return Some(rate);
    }

    let rate = fetch_rate(currency)?;
    if let Err(e) = db::store_rate(currency, rate) {
        debug!(error = %e, "could not persist currency rate");
    }
    Some(rate)
}

/// `$X.XX` when converted, `$X.XX USD` when no rate is known
pub fn format_amount(usd: f64, rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("${:.2}", usd * rate),
        None => format!("${usd:.2} USD"),
    }
}

pub fn format_currency(usd: f64, currency: &str) -> String {
    format_amount(usd, conversion_rate(currency))
}
