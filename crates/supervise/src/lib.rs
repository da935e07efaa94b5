// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pgctl-supervise: adapters over the process-supervision substrate.
//!
//! Everything pgctl knows about s6 lives here: the status probe and its
//! parser, the control channel, advisory file locks, and the /proc-based
//! descriptor scan used to find processes that outlived their supervisor.

pub mod control;
pub mod flock;
pub mod fuser;
pub mod ps;
pub mod status;

pub use control::{sv_control, svok, svstat, ControlError, SvVerb};
pub use flock::{set_inheritable, Flock, FlockError, OnContention};
pub use fuser::fuser;
pub use status::{ProcessPhase, SvState, SvStatus};
