// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-blocking multi-file tail.
//!
//! One `tail -F` child per path; each child's stdout is drained by a reader
//! task into an unbounded line channel, so the engine's polling loop can ask
//! "anything new?" without ever blocking.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// New lines observed on one tailed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailEvent {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

struct TailChild {
    path: PathBuf,
    child: Child,
    rx: mpsc::UnboundedReceiver<String>,
    pending: Vec<String>,
}

pub struct LogTailer {
    children: Vec<TailChild>,
}

impl LogTailer {
    /// Start tailing; follows by name with retry, so rotation and
    /// not-yet-created files are fine.
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Result<Self, std::io::Error> {
        let mut children = Vec::new();
        for path in paths {
            let mut child = Command::new("tail")
                .arg("-F")
                .arg(&path)
                .stdin(std::process::Stdio::null())
                .stdout(std::process::Stdio::piped())
                .stderr(std::process::Stdio::null())
                .kill_on_drop(true)
                .spawn()?;

            let (tx, rx) = mpsc::unbounded_channel();
            let stdout = child.stdout.take();
            tokio::spawn(async move {
                let Some(stdout) = stdout else { return };
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            });

            children.push(TailChild { path, child, rx, pending: Vec::new() });
        }
        Ok(LogTailer { children })
    }

    /// Non-blocking: is there at least one undelivered line?
    pub fn new_lines_available(&mut self) -> bool {
        for child in &mut self.children {
            while let Ok(line) = child.rx.try_recv() {
                child.pending.push(line);
            }
            if !child.pending.is_empty() {
                return true;
            }
        }
        false
    }

    /// Drain everything that has arrived, grouped per file.
    pub fn get_logs(&mut self) -> Vec<TailEvent> {
        let mut events = Vec::new();
        for child in &mut self.children {
            while let Ok(line) = child.rx.try_recv() {
                child.pending.push(line);
            }
            if !child.pending.is_empty() {
                events.push(TailEvent {
                    path: child.path.clone(),
                    lines: std::mem::take(&mut child.pending),
                });
            }
        }
        events
    }

    /// Stop following one path and reap its child.
    pub fn stop_tailing(&mut self, path: &Path) {
        self.children.retain_mut(|child| {
            if child.path != path {
                return true;
            }
            let _ = child.child.start_kill();
            false
        });
    }

    /// Orderly teardown of every child.
    pub fn cleanup(&mut self) {
        for child in &mut self.children {
            let _ = child.child.start_kill();
        }
        self.children.clear();
    }
}

#[cfg(test)]
#[path = "tail_tests.rs"]
mod tests;
