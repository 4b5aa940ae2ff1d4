//! # Store Module
//!
//! Locates usage-log files (`*.jsonl`) under the Claude project directories.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

/// File extension of append-only usage logs
pub const LOG_EXTENSION: &str = "jsonl";

/// The set of project roots that usage logs are read from.
#[derive(Debug, Clone, Default)]
pub struct LogStore {
    roots: Vec<PathBuf>,
}

impl LogStore {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Store over the `projects/` directory of each Claude data directory
    pub fn from_claude_dirs(claude_dirs: &[PathBuf]) -> Self {
        Self::new(claude_dirs.iter().map(|d| d.join("projects")).collect())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Every `.jsonl` file below the roots.
    ///
    /// Missing roots and unreadable subdirectories are skipped. A file that is
    /// reachable from two roots (e.g. through a symlinked config dir) is listed once.
    pub fn find_log_files(&self) -> Vec<PathBuf> {
        self.collect(|path| has_log_extension(path))
    }

    /// Log files named `<session_id>.jsonl`
    pub fn find_session_files(&self, session_id: &str) -> Vec<PathBuf> {
        if session_id.is_empty() {
            return Vec::new();
        }
        let wanted = format!("{session_id}.{LOG_EXTENSION}");
        self.collect(|path| path.file_name().and_then(|n| n.to_str()) == Some(wanted.as_str()))
    }

    fn collect<F>(&self, mut keep: F) -> Vec<PathBuf>
    where
        F: FnMut(&Path) -> bool,
    {
        let mut seen = BTreeSet::new();
        let mut files = Vec::new();
        for root in &self.roots {
            if !root.is_dir() {
                trace!(root = %root.display(), "skipping missing log root");
                continue;
            }
            for entry in WalkDir::new(root).follow_links(true) {
                let entry = match entry {
                    Ok(e) => e,
                    Err(err) => {
                        trace!(error = %err, "skipping unreadable path");
                        continue;
                    }
                };
                if !entry.file_type().is_file() || !keep(entry.path()) {
                    continue;
                }
                let path = entry.into_path();
                let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
                if seen.insert(canonical) {
                    files.push(path);
                }
            }
        }
        files.sort();
        debug!(count = files.len(), "found usage log files");
        files
    }
}

fn has_log_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(&format!(".{LOG_EXTENSION}")))
}
