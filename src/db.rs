//! SQLite-backed exchange rate cache.
//!
//! Rates are stored per lower-cased currency code together with the Unix time
//! they were fetched. Freshness is judged by the caller. The database is opened
//! in WAL mode so several statusline processes can share it.

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::env;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

const DB_FILE_NAME: &str = "claude-statusline.db";

/// A rate as last stored in the cache
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedRate {
    /// Units of the target currency per USD
    pub rate: f64,
    /// Unix seconds
    pub fetched_at: i64,
}

/// Get the database file path
///
/// Checks `CLAUDE_STATUSLINE_DB_PATH` first, falls back to a file in the
/// system temp directory.
fn get_db_path() -> PathBuf {
    if let Ok(custom_path) = env::var("CLAUDE_STATUSLINE_DB_PATH")
        && !custom_path.trim().is_empty()
    {
        return PathBuf::from(custom_path);
    }
    env::temp_dir().join(DB_FILE_NAME)
}

/// Open database connection with WAL mode and retry logic
///
/// "database locked" errors are retried with a linear backoff.
fn open_db() -> Result<Connection> {
    let db_path = get_db_path();

    let mut attempts = 0;
    let max_attempts = 3;

    loop {
        match Connection::open(&db_path) {
            Ok(conn) => {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "busy_timeout", 5000)?;
                init_schema(&conn)?;
                return Ok(conn);
            }
            Err(e) if e.to_string().contains("locked") && attempts < max_attempts => {
                attempts += 1;
                thread::sleep(Duration::from_millis(100 * attempts));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS exchange_rates (
            currency TEXT PRIMARY KEY,
            rate REAL NOT NULL,
            fetched_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        INSERT OR IGNORE INTO metadata (key, value) VALUES ('schema_version', '1');",
    )?;
    Ok(())
}

fn get_rate(conn: &Connection, currency: &str) -> Result<Option<CachedRate>> {
    let result = conn
        .query_row(
            "SELECT rate, fetched_at FROM exchange_rates WHERE currency = ?1",
            params![currency.to_lowercase()],
            |row| {
                Ok(CachedRate {
                    rate: row.get(0)?,
                    fetched_at: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(result)
}

fn set_rate(conn: &Connection, currency: &str, rate: f64, fetched_at: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO exchange_rates (currency, rate, fetched_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(currency) DO UPDATE SET
             rate = excluded.rate,
             fetched_at = excluded.fetched_at",
        params![currency.to_lowercase(), rate, fetched_at],
    )?;
    Ok(())
}

/// Cached rate for `currency` (opens a short-lived connection)
pub fn load_rate(currency: &str) -> Result<Option<CachedRate>> {
    let conn = open_db()?;
    get_rate(&conn, currency)
}

/// Persist a freshly fetched rate, stamped with the current time
pub fn store_rate(currency: &str, rate: f64) -> Result<()> {
    store_rate_at(currency, rate, Utc::now().timestamp())
}

/// Persist a rate with an explicit fetch time
pub fn store_rate_at(currency: &str, rate: f64, fetched_at: i64) -> Result<()> {
    let conn = open_db()?;
    set_rate(&conn, currency, rate, fetched_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    #[serial_test::serial]
    fn test_db_init() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { env::set_var("CLAUDE_STATUSLINE_DB_PATH", db_path.to_str().unwrap()) };

        let conn = open_db().unwrap();
        let version: String = conn
            .query_row(
                "SELECT value FROM metadata WHERE key = 'schema_version'",
                params![],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(version, "1");
        assert!(db_path.exists());
        unsafe { env::remove_var("CLAUDE_STATUSLINE_DB_PATH") };
    }

    #[test]
    #[serial_test::serial]
    fn test_rate_round_trip_is_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("rates.db");
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { env::set_var("CLAUDE_STATUSLINE_DB_PATH", db_path.to_str().unwrap()) };

        assert_eq!(load_rate("CAD").unwrap(), None);

        store_rate_at("CAD", 1.37, 1_700_000_000).unwrap();
        let cached = load_rate("cad").unwrap().unwrap();
        assert_eq!(cached.rate, 1.37);
        assert_eq!(cached.fetched_at, 1_700_000_000);

        // Upsert replaces the old row
        store_rate_at("cad", 1.40, 1_700_000_100).unwrap();
        let cached = load_rate("CAD").unwrap().unwrap();
        assert_eq!(cached.rate, 1.40);
        assert_eq!(cached.fetched_at, 1_700_000_100);

        unsafe { env::remove_var("CLAUDE_STATUSLINE_DB_PATH") };
    }

    #[test]
    #[serial_test::serial]
    fn test_default_path_is_in_temp_dir() {
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { env::remove_var("CLAUDE_STATUSLINE_DB_PATH") };
        assert_eq!(get_db_path(), env::temp_dir().join(DB_FILE_NAME));
    }
}
