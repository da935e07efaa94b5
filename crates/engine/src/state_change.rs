// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three transitions the engine can drive, as data.
//!
//! Each variant bundles the verb it applies to a service, the assertion
//! that decides success, the deadline to honor, whether forcible cleanup is
//! allowed, and the strings shown to the user.

use std::time::Duration;

use crate::errors::EngineError;
use crate::service::Service;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Start,
    Stop,
    /// Bring down the logger sidecar; driven after `Stop` and shown only in
    /// verbose mode.
    StopLogs,
}

/// Outcome of one assertion pass over one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    Success,
    Failure(String),
    /// Re-run the assertion on the next tick (still waiting, or a force
    /// cleanup just happened and the next assertion decides).
    RecheckNeeded,
}

impl StateChange {
    /// Idempotent issue of the verb.
    pub async fn change(self, service: &Service) -> Result<(), EngineError> {
        match self {
            StateChange::Start => service.start().await,
            StateChange::Stop => service.stop().await,
            StateChange::StopLogs => service.stop_logs().await,
        }
    }

    /// The assertion that decides whether the service has arrived.
    pub async fn assert(self, service: &Service) -> Result<(), EngineError> {
        match self {
            StateChange::Start => service.assert_ready().await,
            StateChange::Stop => service.assert_stopped(true).await,
            StateChange::StopLogs => service.assert_stopped(false).await,
        }
    }

    pub fn timeout(self, service: &Service) -> Duration {
        match self {
            StateChange::Start => service.timeout_ready(),
            StateChange::Stop | StateChange::StopLogs => service.timeout_stop(),
        }
    }

    /// Forcible cleanup, where the variant supports it: `Some(warning)` when
    /// processes were killed, `None` when this transition never forces.
    pub fn force(self, service: &Service) -> Result<Option<String>, EngineError> {
        match self {
            StateChange::Stop => service.force_cleanup().map(Some),
            StateChange::Start | StateChange::StopLogs => Ok(None),
        }
    }

    pub fn is_user_facing(self) -> bool {
        !matches!(self, StateChange::StopLogs)
    }

    pub fn verb(self) -> &'static str {
        match self {
            StateChange::Start => "start",
            StateChange::Stop | StateChange::StopLogs => "stop",
        }
    }

    pub fn changing(self) -> &'static str {
        match self {
            StateChange::Start => "Starting:",
            StateChange::Stop => "Stopping:",
            StateChange::StopLogs => "Stopping logger for:",
        }
    }

    pub fn changed(self) -> &'static str {
        match self {
            StateChange::Start => "Started:",
            StateChange::Stop => "Stopped:",
            StateChange::StopLogs => "Stopped logger for:",
        }
    }
}

#[cfg(test)]
#[path = "state_change_tests.rs"]
mod tests;
