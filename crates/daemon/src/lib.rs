// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pgctl-daemon: sidecar processes spawned next to supervised services.

pub mod poll_ready;
pub mod timestamp;

pub use poll_ready::{poll_ready_loop, LoopOutcome, Tunables};
pub use timestamp::prepend_timestamps;
