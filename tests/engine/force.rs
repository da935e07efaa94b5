//! Forcible-cleanup specs (require s6 on PATH).
//!
//! The runaway child ignores SIGTERM, so the graceful stop window elapses;
//! with force enabled pgctl SIGKILLs whatever still holds the supervisor
//! lock, with `--no-force` it reports and gives up.

use crate::prelude::*;
use crate::require_s6;

/// A run script whose background child shrugs off SIGTERM. The child
/// inherits the supervisor-lifetime lock descriptor, which is exactly how
/// escaped processes are found. Bounded sleep so an assertion failure can
/// never leak a process for long.
const RUNAWAY_RUN: &str = "#!/bin/sh\nsh -c 'trap \"\" TERM; sleep 45' &\nexec sleep 45\n";

#[test]
#[serial]
fn force_cleanup_kills_runaways_on_stop() {
    require_s6!();
    let playground = Playground::new();
    playground.service("runaway", RUNAWAY_RUN);
    playground.file("playground/runaway/timeout-stop", "1");

    playground.pgctl().args(&["start", "runaway"]).passes();

    playground
        .pgctl()
        .args(&["stop", "runaway"])
        .passes()
        .stderr_has("WARNING: Killing these runaway processes");

    let status = playground.pgctl().args(&["--json", "status", "runaway"]).passes();
    let parsed: serde_json::Value = serde_json::from_str(&status.stdout).expect("valid JSON");
    assert_eq!(parsed["runaway"]["state"], "down");
}

#[test]
#[serial]
fn no_force_reports_the_runaways_and_fails() {
    require_s6!();
    let playground = Playground::new();
    playground.service("runaway", RUNAWAY_RUN);
    playground.file("playground/runaway/timeout-stop", "1");

    playground.pgctl().args(&["start", "runaway"]).passes();

    playground
        .pgctl()
        .args(&["--no-force", "stop", "runaway"])
        .fails()
        .stderr_has("these runaway processes did not stop")
        .stderr_has("Some services failed to stop: runaway");

    // clean up: the forceful path reaps the orphan
    playground.pgctl().args(&["stop", "runaway"]).passes();
}
