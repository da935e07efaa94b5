// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-level error taxonomy.
//!
//! These are the errors shown to an operator without a backtrace: the CLI
//! renders them as a single `[pgctl] ERROR: …` line on stderr and exits 1.
//! Programmer errors (I/O failures outside the expected set, unparseable
//! supervisor output) travel separately and keep their context chain.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    /// No directory with the configured playground name exists between the
    /// working directory and the filesystem root.
    #[error("could not find any directory named '{pgdir}'")]
    NoPlayground { pgdir: String },

    /// A named service has no directory under the playground.
    #[error("no such playground service: '{name}'")]
    NoSuchService { name: String },

    /// The alias graph revisited a name during expansion.
    #[error("Circular aliases! Visited twice during alias expansion: '{name}'")]
    CircularAliases { name: String },

    /// A transition cannot proceed because another pgctl invocation (or an
    /// escaped process) holds the per-service lock.
    #[error("{message}")]
    LockHeld { message: String },

    /// The assertion for the target state failed. Expected during a polling
    /// loop; only fatal once the deadline is crossed.
    #[error("not {expected}: {status}")]
    NotReady { expected: &'static str, status: String },

    /// The control channel reports the supervisor is gone. Recovered by the
    /// next assertion cycle.
    #[error("supervisor is down")]
    Unsupervised,

    /// Some services did not reach the requested state before their deadline.
    #[error("Some services failed to {action}: {failed}")]
    Failures { action: &'static str, failed: String },

    /// Catch-all for one-off user messages (bad command arity, unimplemented
    /// commands, config parse problems).
    #[error("{0}")]
    Message(String),
}

impl UserError {
    pub fn message(text: impl Into<String>) -> Self {
        UserError::Message(text.into())
    }

    /// True for the errors the polling loop treats as "try again later"
    /// rather than propagating.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            UserError::NotReady { .. } | UserError::Unsupervised | UserError::LockHeld { .. }
        )
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
