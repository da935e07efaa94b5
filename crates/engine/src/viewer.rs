// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-height bordered log panel for interactive transitions.
//!
//! The viewer never prints: it builds each frame as a single string and
//! hands it to the engine, which writes frame plus progress lines in one
//! syscall to avoid flicker.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::tail::LogTailer;

/// 7-bit C1 ANSI escapes (Fe sequences, plus full CSI sequences).
const ANSI_PATTERN: &str = r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])";

/// Width used when the terminal reports nothing useful (pty spawning often
/// reports 0x0).
const FALLBACK_WIDTH: usize = 80;

pub struct LogViewer {
    tailer: LogTailer,
    height: usize,
    prev_width: Option<usize>,
    visible_lines: Vec<String>,
    name_to_path: Vec<(String, PathBuf)>,
    path_to_name: HashMap<PathBuf, String>,
}

impl LogViewer {
    pub fn new(
        height: usize,
        name_to_path: Vec<(String, PathBuf)>,
    ) -> Result<Self, std::io::Error> {
        let tailer = LogTailer::new(name_to_path.iter().map(|(_, path)| path.clone()))?;
        let path_to_name = name_to_path
            .iter()
            .map(|(name, path)| (path.clone(), name.clone()))
            .collect();
        Ok(LogViewer {
            tailer,
            height,
            prev_width: None,
            visible_lines: Vec::new(),
            name_to_path,
            path_to_name,
        })
    }

    fn terminal_width() -> usize {
        let width = terminal_size::terminal_size()
            .map(|(width, _)| width.0 as usize)
            .unwrap_or(FALLBACK_WIDTH);
        if width <= 5 {
            FALLBACK_WIDTH
        } else {
            width
        }
    }

    /// True when there are new log lines or the terminal was resized.
    pub fn redraw_needed(&mut self) -> bool {
        self.tailer.new_lines_available() || self.prev_width != Some(Self::terminal_width())
    }

    /// Cursor-up past the previous frame, or nothing before the first draw.
    pub fn move_cursor_to_top(&self) -> String {
        if self.prev_width.is_some() {
            format!("\x1b[{}F", self.height + 1)
        } else {
            String::new()
        }
    }

    /// Clear from the cursor to the end of the screen.
    pub fn clear_below(&self) -> String {
        "\x1b[0J".to_string()
    }

    /// Build one frame: title line plus the bordered panel with the last
    /// `height - 2` log lines, escape-stripped and `[name]`-prefixed.
    pub fn draw_logs(&mut self, title: &str) -> String {
        let width = Self::terminal_width();

        for event in self.tailer.get_logs() {
            let name = self
                .path_to_name
                .get(&event.path)
                .cloned()
                .unwrap_or_else(|| event.path.display().to_string());
            for line in event.lines {
                self.visible_lines.push(format!("[{name}] {}", strip_ansi(&line)));
            }
        }
        let keep = self.height.saturating_sub(2);
        if self.visible_lines.len() > keep {
            self.visible_lines.drain(..self.visible_lines.len() - keep);
        }

        let mut content = format!("\x1b[?7l{title}\n\x1b[?7h");
        content.push_str(&drawn_box(width.saturating_sub(1), self.height, &self.visible_lines));

        self.prev_width = Some(width);
        content
    }

    pub fn stop_tailing(&mut self, name: &str) {
        let found = self.name_to_path.iter().find(|(n, _)| n == name).map(|(_, p)| p.clone());
        if let Some(path) = found {
            self.tailer.stop_tailing(&path);
        }
    }

    pub fn cleanup(&mut self) {
        self.tailer.cleanup();
    }
}

/// Strip 7-bit C1 ANSI escapes from a log line.
pub fn strip_ansi(line: &str) -> String {
    match ansi_regex() {
        Some(regex) => regex.replace_all(line, "").into_owned(),
        None => line.to_string(),
    }
}

fn ansi_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(ANSI_PATTERN).ok()).as_ref()
}

/// A bold box-drawing frame around the content lines, each truncated to the
/// inner width and padded so stale characters never show through.
fn drawn_box(width: usize, height: usize, content_lines: &[String]) -> String {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(2);

    let mut out = String::new();
    // Disable screen wrap, hide the cursor, top border.
    out.push_str("\x1b[?7l\x1b[?25l\x1b[1m╔");
    out.push_str(&"═".repeat(inner_width));
    out.push_str("╗\x1b[0K\x1b[0m\n");

    for i in 0..inner_height {
        let line = content_lines.get(i).map(String::as_str).unwrap_or("");
        let truncated: String = line.chars().take(inner_width).collect();
        out.push_str("\x1b[1m║\x1b[0m");
        out.push_str(&truncated);
        out.push_str(&" ".repeat(inner_width.saturating_sub(truncated.chars().count())));
        out.push_str(&format!("\x1b[{width}G\x1b[1m║\x1b[0K\x1b[0m\n"));
    }

    // Bottom border, re-enable wrap, show the cursor.
    out.push_str("\x1b[1m╚");
    out.push_str(&"═".repeat(inner_width));
    out.push_str("╝\x1b[0K\x1b[0m\n\x1b[?7h\x1b[?25h");
    out
}

#[cfg(test)]
#[path = "viewer_tests.rs"]
mod tests;
