// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed supervisor status.
//!
//! `s6-svstat` reports one line of free-ish text; this module turns it into
//! a tagged record. The grammar is small but crusty — see the parser tests
//! for the literal forms in the wild, including the stray NUL s6 sometimes
//! appends to `want up`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Supervisor-reported state of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SvState {
    Up,
    Ready,
    Down,
    /// The supervisor itself is gone. Reported to users as `down`.
    Unsupervised,
    /// The service directory is unusable (`unable to chdir`).
    Invalid,
    /// Unrecognized probe output, carried verbatim.
    Unknown(String),
}

/// Whether the supervisor is converging toward a different state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessPhase {
    Starting,
    Stopping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SvStatus {
    pub state: SvState,
    pub pid: Option<i32>,
    pub exitcode: Option<i32>,
    pub seconds: Option<i64>,
    pub process: Option<ProcessPhase>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusParseError {
    /// `want` carried something other than `up` or `down`; the probe
    /// contract is broken and this should surface loudly.
    #[error("unexpected want value in svstat output: '{0}'")]
    UnexpectedWant(String),
}

impl SvStatus {
    pub const UNSUPERVISED: &'static str = "could not get status, supervisor is down";
    pub const INVALID: &'static str = "no such service";

    pub fn unsupervised() -> Self {
        SvStatus {
            state: SvState::Unsupervised,
            pid: None,
            exitcode: None,
            seconds: None,
            process: None,
        }
    }

    /// Parse one line of `s6-svstat` output (or its fatal stderr).
    pub fn parse(raw: &str) -> Result<Self, StatusParseError> {
        // s6 sometimes writes "want up\0"; scrub NULs before anything else.
        let cleaned = raw.replace('\0', "");
        let status = cleaned.trim();

        let (state, mut rest) = match split_state(status) {
            Some(parts) => parts,
            None => {
                return Ok(SvStatus {
                    state: SvState::Unknown(status.to_string()),
                    pid: None,
                    exitcode: None,
                    seconds: None,
                    process: None,
                })
            }
        };
        let mut state = state;

        if matches!(state, SvState::Unsupervised | SvState::Invalid) {
            return Ok(SvStatus { state, pid: None, exitcode: None, seconds: None, process: None });
        }

        let pid = match take_paren_field(rest, "(pid ") {
            Some((pid, after)) => {
                rest = after;
                pid
            }
            None => None,
        };
        let exitcode = match take_paren_field(rest, "(exitcode ") {
            Some((exitcode, after)) => {
                rest = after;
                exitcode
            }
            None => None,
        };

        let mut seconds = None;
        if let Some((count, after)) = rest.split_once(" seconds") {
            if let Ok(count) = count.trim().parse::<i64>() {
                seconds = Some(count);
                rest = after;
            }
        }

        let mut process = match rest.split_once(", want ") {
            Some((_, want)) => match want.split(',').next().unwrap_or(want).trim() {
                "up" => Some(ProcessPhase::Starting),
                "down" => Some(ProcessPhase::Stopping),
                other => return Err(StatusParseError::UnexpectedWant(other.to_string())),
            },
            None => None,
        };

        if let Some(after) = rest.strip_prefix(", ready ") {
            if let Some((count, _)) = after.split_once(" seconds") {
                if let Ok(count) = count.trim().parse::<i64>() {
                    state = SvState::Ready;
                    seconds = Some(count);
                    process = None;
                }
            }
        }

        Ok(SvStatus { state, pid, exitcode, seconds, process })
    }

    /// State as shown to users: `unsupervised` collapses to `down`.
    pub fn user_state(&self) -> &str {
        match &self.state {
            SvState::Up => "up",
            SvState::Ready => "ready",
            SvState::Down | SvState::Unsupervised => "down",
            SvState::Invalid => Self::INVALID,
            SvState::Unknown(text) => text,
        }
    }

    pub fn process_label(&self) -> Option<&'static str> {
        match self.process {
            Some(ProcessPhase::Starting) => Some("starting"),
            Some(ProcessPhase::Stopping) => Some("stopping"),
            None => None,
        }
    }
}

impl fmt::Display for SvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            SvState::Up => write!(f, "up")?,
            SvState::Ready => write!(f, "ready")?,
            SvState::Down => write!(f, "down")?,
            SvState::Unsupervised => write!(f, "{}", Self::UNSUPERVISED)?,
            SvState::Invalid => write!(f, "{}", Self::INVALID)?,
            SvState::Unknown(text) => write!(f, "{text}")?,
        }
        if let Some(pid) = self.pid {
            write!(f, " (pid {pid})")?;
        }
        if let Some(exitcode) = self.exitcode {
            write!(f, " (exitcode {exitcode})")?;
        }
        if let Some(seconds) = self.seconds {
            write!(f, " {seconds} seconds")?;
        }
        if let Some(label) = self.process_label() {
            write!(f, ", {label}")?;
        }
        Ok(())
    }
}

fn split_state(status: &str) -> Option<(SvState, &str)> {
    if let Some(rest) = status.strip_prefix("up ") {
        return Some((SvState::Up, rest));
    }
    if let Some(rest) = status.strip_prefix("down ") {
        return Some((SvState::Down, rest));
    }
    if let Some(rest) = status.strip_prefix("unable to chdir:") {
        return Some((SvState::Invalid, rest));
    }
    if status.starts_with("s6-svstat: fatal: unable to read status for ")
        && (status.ends_with(": No such file or directory") || status.ends_with(": Broken pipe"))
    {
        return Some((SvState::Unsupervised, ""));
    }
    None
}

/// Parse a `"(name N) "`-prefixed integer field, returning the value and the
/// remaining text.
fn take_paren_field<'a>(rest: &'a str, prefix: &str) -> Option<(Option<i32>, &'a str)> {
    let inner = rest.strip_prefix(prefix)?;
    let (value, after) = inner.split_once(") ")?;
    let value = value.trim().parse::<i32>().ok()?;
    Some((Some(value), after))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
