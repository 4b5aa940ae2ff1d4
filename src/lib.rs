//! # Claude Status Line
//!
//! A compact status line for Claude Code sessions, plus a countdown for the
//! 5-hour usage window.
//!
//! ## Overview
//!
//! The statusline binary reads the Claude Code hook JSON from stdin and prints
//! one line showing:
//! - the model and the session cost in a local currency
//! - session token totals and cache share
//! - context window fill
//! - time left in the active usage window
//! - working directory and Git branch
//!
//! Usage comes from the JSONL transcripts Claude Code writes under
//! `~/.claude/projects` (and the legacy `~/.config/claude/projects`).
//!
//! ## Features
//!
//! - `git` (default): Enables branch lookup via gix
//! - `colors` (default): Enables countdown colors via owo-colors

/// Command-line argument parsing and configuration
pub mod cli;

/// USD conversion with a cached exchange rate
pub mod currency;

/// SQLite exchange rate cache
pub mod db;

/// Status line assembly and countdown rendering
pub mod display;

/// Git repository inspection (feature-gated)
#[cfg(feature = "git")]
pub mod git;

/// Stderr logging setup
pub mod logging;

/// Per-session token and model aggregation
pub mod metrics;

/// Data models for hooks, entries, blocks, and Git info
pub mod models;

/// Live window countdown
pub mod monitor;

/// Model-specific pricing calculations
pub mod pricing;

/// Runtime driver for the binaries
pub mod runtime;

/// Discovery of usage log files
pub mod store;

/// Log line parsing and usage loading
pub mod usage;

/// Utility functions for paths, formatting, and context limits
pub mod utils;

/// Session block reconstruction and the active window
pub mod window;
