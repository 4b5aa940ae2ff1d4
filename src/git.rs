//! # Git Module
//!
//! Current branch lookup using the gix library.

use crate::models::git::GitInfo;
use std::path::Path;

/// Branch checked out in the work tree containing `start_dir`.
///
/// Detached HEAD, an unborn repository without a symbolic ref, or a directory
/// outside any repository all yield `None`.
pub fn read_git_info(start_dir: &Path) -> Option<GitInfo> {
    let repo = gix::discover(start_dir).ok()?;
    let head = repo.head().ok()?;
    let name = head.referent_name()?;
    let branch = name.shorten().to_string();
    if branch.is_empty() {
        return None;
    }
    Some(GitInfo { branch })
}
