//! Restart specs (require s6 on PATH).

use crate::prelude::*;
use crate::require_s6;

#[test]
#[serial]
fn restart_ends_ready() {
    require_s6!();
    let playground = Playground::new();
    playground.service("date", "#!/bin/sh\nexec sleep 60\n");

    playground.pgctl().args(&["start", "date"]).passes();
    playground
        .pgctl()
        .args(&["restart", "date"])
        .passes()
        .stderr_has("Stopped: date")
        .stderr_has("Started: date");

    let json = playground.pgctl().args(&["--json", "status", "date"]).passes();
    let parsed: serde_json::Value = serde_json::from_str(&json.stdout).expect("valid JSON");
    assert_eq!(parsed["date"]["state"], "ready");

    playground.pgctl().args(&["stop", "date"]).passes();
}

/// The logger stays up across the stop half of a restart, so both runs'
/// output lands in the same `logs/current` file.
#[test]
#[serial]
fn restart_preserves_log_continuity() {
    require_s6!();
    let playground = Playground::new();
    playground.service("chatty", "#!/bin/sh\necho run-began\nexec sleep 60\n");

    playground.pgctl().args(&["start", "chatty"]).passes();
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || playground.service_log("chatty").contains("run-began")),
        "first run never logged; log:\n{}",
        playground.service_log("chatty"),
    );

    playground.pgctl().args(&["restart", "chatty"]).passes();
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            playground.service_log("chatty").matches("run-began").count() >= 2
        }),
        "second run's output missing from the same log; log:\n{}",
        playground.service_log("chatty"),
    );

    playground.pgctl().args(&["stop", "chatty"]).passes();
}
