// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-facing output helpers.
//!
//! Stdout is reserved for program data; progress goes to stderr with the
//! `[pgctl]` channel prefix.

use std::io::Write;
use std::path::Path;

use pgctl_core::CHANNEL;

/// Print one `[pgctl] …` progress line to stderr, unbuffered.
pub fn pgctl_print(message: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{CHANNEL} {message}");
    let _ = stderr.flush();
}

/// Join names with commas for user messages.
pub fn commafy(items: &[String]) -> String {
    items.join(", ")
}

/// A relative path, but only if the target sits under the current directory.
pub fn bestrelpath(path: &Path) -> String {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => return path.display().to_string(),
    };
    match path.strip_prefix(&cwd) {
        Ok(relative) => relative.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

/// Last `count` lines of a file, or `None` when it cannot be read.
pub fn tail_lines(path: &Path, count: usize) -> Option<Vec<String>> {
    let content = std::fs::read_to_string(path).ok()?;
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(count);
    Some(lines[start..].iter().map(|line| line.to_string()).collect())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
