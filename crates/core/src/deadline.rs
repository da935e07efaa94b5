// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadline algebra for the polling loop.
//!
//! The loop wakes once per poll interval and re-runs each service's state
//! assertion. Assertions can themselves be slow (`lsof`-class probes), so a
//! naive `now >= deadline` check always overshoots by up to one interval.
//! Instead the loop gives up at the tick whose distance from the deadline is
//! minimal: the next tick is predicted from the cost of the current one, and
//! the timeout fires only if waiting would land us further from the deadline
//! than we already are. The predicted tick can sit *before* the deadline when
//! the interval is large relative to assertion cost; that trade is
//! intentional.

use std::time::{Duration, Instant};

/// True when the current tick is the poll closest to `start + timeout`.
///
/// `check` is when this tick's assertion began and `now` is when it
/// completed; the next assertion is expected to complete near
/// `now + (now - check)`.
pub fn deadline_reached(timeout: Duration, start: Instant, check: Instant, now: Instant) -> bool {
    let limit = start + timeout;
    let next = now + now.duration_since(check);
    distance(now, limit) < distance(next, limit)
}

/// Seconds until the deadline, clamped at zero once past it.
pub fn remaining(timeout: Duration, start: Instant, now: Instant) -> Duration {
    (start + timeout).saturating_duration_since(now)
}

fn distance(a: Instant, b: Instant) -> Duration {
    if a >= b {
        a.duration_since(b)
    } else {
        b.duration_since(a)
    }
}

#[cfg(test)]
#[path = "deadline_tests.rs"]
mod tests;
