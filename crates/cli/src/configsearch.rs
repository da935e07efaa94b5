// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upward filesystem search for playground roots and config files.
//!
//! The walk stops at the filesystem boundary: crossing onto a different
//! device (an NFS home, a bind mount) would make "my project's playground"
//! mean something surprising.

use std::path::{Path, PathBuf};

use nix::sys::stat::stat;

/// Ancestors of `start` (inclusive) that live on the same filesystem.
pub fn search_parent_directories(start: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let Ok(origin) = stat(start) else { return found };

    let mut current = start.to_path_buf();
    loop {
        match stat(&current) {
            Ok(st) if st.st_dev == origin.st_dev => found.push(current.clone()),
            _ => break,
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    found
}

/// Paths matching `pattern` (a glob, relative to each ancestor), nearest
/// directory first, insecure hits skipped.
pub fn configsearch(start: &Path, pattern: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for dir in search_parent_directories(start) {
        let full = dir.join(pattern);
        let Some(full) = full.to_str() else { continue };
        let Ok(paths) = glob::glob(full) else { continue };
        for path in paths.flatten() {
            if !is_insecure(&path) {
                found.push(path);
            }
        }
    }
    found
}

/// A path someone other than the owner can alter must not feed config.
/// Sticky-bit directories (e.g. /tmp) get a pass.
fn is_insecure(path: &Path) -> bool {
    use nix::sys::stat::Mode;
    let Ok(st) = stat(path) else { return true };
    let mode = Mode::from_bits_truncate(st.st_mode);
    if path.is_dir() && mode.contains(Mode::S_ISVTX) {
        return false;
    }
    mode.intersects(Mode::S_IWGRP | Mode::S_IWOTH)
}

#[cfg(test)]
#[path = "configsearch_tests.rs"]
mod tests;
