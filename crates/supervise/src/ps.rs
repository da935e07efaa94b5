// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable process tables for lock-contention diagnostics.

use std::process::Command;

/// A (somewhat) human-readable printout of a list of processes.
///
/// Returns an empty string when there is nothing to show — including the
/// race where every pid exits between enumeration and `ps`, leaving only
/// the header row.
pub fn ps_table(pids: &[i32]) -> String {
    if pids.is_empty() {
        return String::new();
    }

    let mut command = Command::new("ps");
    command.args(["--forest", "-wwfj"]);
    for pid in pids {
        command.arg(pid.to_string());
    }

    let output = match command.output() {
        Ok(output) => output,
        Err(_) => return String::new(),
    };
    let table = String::from_utf8_lossy(&output.stdout);
    if table.lines().count() > 1 {
        table.into_owned()
    } else {
        String::new()
    }
}

#[cfg(test)]
#[path = "ps_tests.rs"]
mod tests;
