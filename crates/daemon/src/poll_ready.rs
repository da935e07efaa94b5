// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The readiness daemon's polling state machine.
//!
//! Startup phase: poll `./ready` until it succeeds, then signal readiness on
//! the supervisor's notification descriptor. Heartbeat phase: keep polling;
//! sustained failure past the budget hands the service back to `pgctl
//! restart`. A `d` on the down-event pipe ends either phase cleanly.
//!
//! Everything external (the ready check, the down event, the notification
//! write, sleeping) is injected, so the state machine is testable without a
//! supervisor.

use std::path::Path;

/// Polling cadence and failure budget, resolved file-first, then
/// environment, then default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    /// Seconds of cumulative failure tolerated (startup and heartbeat).
    pub timeout_ready: f64,
    /// Seconds between ready checks before the first success.
    pub poll_ready: f64,
    /// Seconds between ready checks once up.
    pub poll_down: f64,
}

impl Tunables {
    pub const DEFAULT_TIMEOUT: f64 = 2.0;
    pub const DEFAULT_POLL_READY: f64 = 0.15;
    pub const DEFAULT_POLL_DOWN: f64 = 10.0;

    /// Resolve tunables from a service directory's metadata files and the
    /// process environment.
    pub fn discover(dir: &Path, env: impl Fn(&str) -> Option<String>) -> Tunables {
        Tunables {
            timeout_ready: getval(dir, "timeout-ready", &env, "PGCTL_TIMEOUT", Self::DEFAULT_TIMEOUT),
            poll_ready: getval(dir, "poll-ready", &env, "PGCTL_POLL", Self::DEFAULT_POLL_READY),
            poll_down: getval(dir, "poll-down", &env, "PGCTL_POLL", Self::DEFAULT_POLL_DOWN),
        }
    }
}

/// A float from a metadata file, an environment variable, or the default.
fn getval(
    dir: &Path,
    filename: &str,
    env: impl Fn(&str) -> Option<String>,
    envname: &str,
    default: f64,
) -> f64 {
    if let Ok(text) = std::fs::read_to_string(dir.join(filename)) {
        if let Ok(value) = text.trim().parse::<f64>() {
            return value;
        }
    }
    env(envname).and_then(|value| value.trim().parse::<f64>().ok()).unwrap_or(default)
}

/// Why the polling loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// Teardown observed before the service ever became ready.
    DownDuringStartup,
    /// The ready check never succeeded within the budget.
    StartupTimedOut,
    /// Teardown observed while heartbeating; the normal exit.
    DownDuringHeartbeat,
    /// Sustained heartbeat failure: the caller should restart the service.
    RestartNeeded,
}

/// Run the startup and heartbeat phases to completion.
pub fn poll_ready_loop(
    mut down_event: impl FnMut() -> bool,
    mut check_ready: impl FnMut() -> bool,
    mut notify_ready: impl FnMut() -> std::io::Result<()>,
    tunables: Tunables,
    mut sleep: impl FnMut(f64),
    mut log: impl FnMut(&str),
) -> LoopOutcome {
    // Startup: wait for the first success.
    let mut remaining = tunables.timeout_ready;
    loop {
        if down_event() {
            log("service is stopping -- quitting the poll");
            return LoopOutcome::DownDuringStartup;
        }
        if check_ready() {
            log("service's ready check succeeded");
            if let Err(err) = notify_ready() {
                log(&format!("could not write readiness notification: {err}"));
            }
            break;
        }
        if remaining <= 0.0 {
            log("timeout while waiting for ready");
            return LoopOutcome::StartupTimedOut;
        }
        sleep(tunables.poll_ready);
        remaining -= tunables.poll_ready;
    }

    // Heartbeat: a success resets the failure budget; running out of budget
    // hands the service to `pgctl restart`.
    let mut remaining = tunables.timeout_ready;
    loop {
        if down_event() {
            log("service is stopping -- quitting the poll");
            return LoopOutcome::DownDuringHeartbeat;
        }
        if check_ready() {
            remaining = tunables.timeout_ready;
            sleep(tunables.poll_down);
        } else {
            if remaining <= 0.0 {
                log("service's ready check failed -- we are restarting it for you");
                return LoopOutcome::RestartNeeded;
            }
            log(&format!("failed (restarting in {remaining:.1}s)"));
            sleep(tunables.poll_down);
            remaining -= tunables.poll_down;
        }
    }
}

#[cfg(test)]
#[path = "poll_ready_tests.rs"]
mod tests;
