// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ANSI styling for the status display.

use std::io::IsTerminal;

pub const BOLD: &str = "\x1b[1m";
pub const ENDC: &str = "\x1b[0m";

pub const GREEN: &str = "\x1b[92m";
pub const RED: &str = "\x1b[91m";
pub const YELLOW: &str = "\x1b[93m";

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Wrap `text` in `style` when styling is on; pass it through otherwise.
pub fn wrap(text: &str, style: &str, enabled: bool) -> String {
    if enabled {
        format!("{style}{text}{ENDC}")
    } else {
        text.to_string()
    }
}

/// The bullet color for a user-facing service state, if it has one.
pub fn state_color(state: &str) -> Option<&'static str> {
    match state {
        "ready" => Some(GREEN),
        "up" => Some(YELLOW),
        "down" => Some(RED),
        _ => None,
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
