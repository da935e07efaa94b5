// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Find processes holding an open descriptor to a path.
//!
//! Walks `/proc/<pid>/fd/*` comparing each descriptor's `(inode, device)`
//! against the target. Other users' fd directories are unreadable, so the
//! scan naturally reports only the current user's processes — force-cleanup
//! relies on that scoping. Entries vanishing mid-scan are skipped silently.

use std::path::Path;

use nix::sys::stat::{stat, FileStat};
use tracing::debug;

/// Process ids (current user's) with an open descriptor to `path`.
///
/// When `allow_deleted` is set, a descriptor whose link target reads
/// `"<path> (deleted)"` with a zero link count also matches; this finds
/// holders of a lock file that was unlinked out from under them.
pub fn fuser(path: &Path, allow_deleted: bool) -> Vec<i32> {
    let target = match stat(path) {
        Ok(st) => Some((st.st_ino, st.st_dev)),
        Err(err) => {
            debug!("fuser suppressed: {path:?}: {err}");
            if allow_deleted {
                None
            } else {
                return Vec::new();
            }
        }
    };
    let deleted_name = format!("{} (deleted)", path.display());

    let mut pids = Vec::new();
    let proc_entries = match std::fs::read_dir("/proc") {
        Ok(entries) => entries,
        Err(_) => return pids,
    };

    for entry in proc_entries.flatten() {
        let pid: i32 = match entry.file_name().to_string_lossy().parse() {
            Ok(pid) => pid,
            Err(_) => continue,
        };

        let fd_dir = entry.path().join("fd");
        let fds = match std::fs::read_dir(&fd_dir) {
            Ok(fds) => fds,
            // permission denied (another user) or the process is gone
            Err(_) => continue,
        };

        for fd in fds.flatten() {
            let fd_path = fd.path();
            let found = match stat(&fd_path) {
                Ok(st) => st,
                Err(_) => continue,
            };
            if Some((found.st_ino, found.st_dev)) == target
                || (allow_deleted && is_deleted_match(&fd_path, &found, &deleted_name))
            {
                pids.push(pid);
                break;
            }
        }
    }

    pids
}

fn is_deleted_match(fd_path: &Path, found: &FileStat, deleted_name: &str) -> bool {
    if found.st_nlink != 0 {
        return false;
    }
    match std::fs::read_link(fd_path) {
        Ok(link) => link.to_string_lossy() == deleted_name,
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "fuser_tests.rs"]
mod tests;
