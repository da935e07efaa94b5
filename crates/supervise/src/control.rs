// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control and status probes for the s6 supervision substrate.

use std::path::Path;

use thiserror::Error;
use tokio::process::Command;
use tracing::trace;

use crate::status::{StatusParseError, SvStatus};

#[derive(Debug, Error)]
pub enum ControlError {
    /// s6-svc could not reach a supervisor for this service. Not fatal: the
    /// engine re-asserts state and decides from there.
    #[error("unable to control the service: supervisor is down")]
    Unsupervised,

    #[error("`{command}` failed: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error(transparent)]
    Status(#[from] StatusParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Verbs pgctl issues against a supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvVerb {
    /// `-u`: bring the service up and keep it up.
    Up,
    /// `-dx`: bring the service down and make the supervisor exit.
    DownAndUnsupervise,
}

impl SvVerb {
    fn flag(self) -> &'static str {
        match self {
            SvVerb::Up => "-u",
            SvVerb::DownAndUnsupervise => "-dx",
        }
    }
}

/// Issue a control verb against a supervised service directory.
pub async fn sv_control(verb: SvVerb, path: &Path) -> Result<(), ControlError> {
    trace!("CMD: s6-svc {} {}", verb.flag(), path.display());
    // s6-svc never writes to stdout.
    let output = Command::new("s6-svc").arg(verb.flag()).arg(path).output().await?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    if stderr.starts_with("s6-svc: fatal: unable to control ") {
        return Err(ControlError::Unsupervised);
    }
    if !output.status.success() {
        return Err(ControlError::CommandFailed {
            command: format!("s6-svc {} {}", verb.flag(), path.display()),
            detail: stderr.trim().to_string(),
        });
    }
    Ok(())
}

/// Is a supervisor alive for this service directory?
pub async fn svok(path: &Path) -> Result<bool, ControlError> {
    let status = Command::new("s6-svok")
        .arg(path)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await?;
    Ok(status.success())
}

/// Probe and parse the status of a supervised service directory.
pub async fn svstat(path: &Path) -> Result<SvStatus, ControlError> {
    if !svok(path).await? {
        return Ok(SvStatus::unsupervised());
    }

    let output = Command::new("s6-svstat").arg(path).output().await?;
    // The fatal forms arrive on stderr; everything else on stdout.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = if stdout.trim().is_empty() { stderr } else { stdout };
    trace!("RAW: {}", line.trim());

    Ok(SvStatus::parse(&line)?)
}
