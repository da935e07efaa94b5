// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error plumbing.

use pgctl_core::UserError;
use pgctl_supervise::{ControlError, FlockError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Operator-facing; rendered without a backtrace at the CLI boundary.
    #[error(transparent)]
    User(#[from] UserError),

    /// Everything else keeps its context chain and surfaces loudly.
    #[error(transparent)]
    Control(ControlError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn user(&self) -> Option<&UserError> {
        match self {
            EngineError::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn not_ready(expected: &'static str, status: impl ToString) -> Self {
        EngineError::User(UserError::NotReady { expected, status: status.to_string() })
    }
}

impl From<ControlError> for EngineError {
    fn from(err: ControlError) -> Self {
        match err {
            // the sentinel, not a failure: the next assertion cycle decides
            ControlError::Unsupervised => EngineError::User(UserError::Unsupervised),
            other => EngineError::Control(other),
        }
    }
}

impl From<FlockError> for EngineError {
    fn from(err: FlockError) -> Self {
        match err {
            FlockError::Held { message } => EngineError::User(UserError::LockHeld { message }),
            FlockError::Contended { path } => EngineError::User(UserError::LockHeld {
                message: format!("lock is held: {}", path.display()),
            }),
            FlockError::Io(io) => EngineError::Io(io),
        }
    }
}
