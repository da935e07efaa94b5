// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

use pgctl_engine::EngineError;

#[derive(Debug)]
pub struct ExitError {
    pub code: u8,
    pub message: String,
    /// User errors render as a `[pgctl] ERROR: …` line; everything else is
    /// shown with its full context chain.
    pub user_level: bool,
}

impl ExitError {
    pub fn user(message: impl Into<String>) -> Self {
        Self { code: 1, message: message.into(), user_level: true }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self { code: 1, message: message.into(), user_level: false }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<EngineError> for ExitError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::User(user) => ExitError::user(user.to_string()),
            other => ExitError::fatal(format!("{:?}", anyhow::Error::from(other))),
        }
    }
}

impl From<pgctl_core::UserError> for ExitError {
    fn from(err: pgctl_core::UserError) -> Self {
        ExitError::user(err.to_string())
    }
}

impl From<std::io::Error> for ExitError {
    fn from(err: std::io::Error) -> Self {
        ExitError::fatal(format!("{:?}", anyhow::Error::from(err)))
    }
}
