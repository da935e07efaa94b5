//! Start/stop lifecycle specs (require s6 on PATH).

use crate::prelude::*;
use crate::require_s6;

#[test]
#[serial]
fn start_a_single_fast_service() {
    require_s6!();
    let playground = Playground::new();
    playground.service("date", "#!/bin/sh\ndate > now.txt\nexec sleep 60\n");

    playground
        .pgctl()
        .args(&["start", "date"])
        .passes()
        .stderr_has("[pgctl] Starting: date")
        .stderr_has("[pgctl] Started: date");

    assert!(playground.playground_dir().join("date").join("now.txt").exists());

    playground.pgctl().args(&["stop", "date"]).passes().stderr_has("[pgctl] Stopped: date");
}

#[test]
#[serial]
fn start_is_idempotent() {
    require_s6!();
    let playground = Playground::new();
    playground.service("date", "#!/bin/sh\nexec sleep 60\n");

    playground.pgctl().args(&["start", "date"]).passes().stderr_has("Started: date");
    playground
        .pgctl()
        .args(&["start", "date"])
        .passes()
        .stderr_has("Already started: date")
        .stderr_lacks("Starting:");

    playground.pgctl().args(&["stop", "date"]).passes();
}

#[test]
#[serial]
fn stop_is_idempotent() {
    require_s6!();
    let playground = Playground::new();
    playground.service("date", "#!/bin/sh\nexec sleep 60\n");

    playground.pgctl().args(&["start", "date"]).passes();
    playground.pgctl().args(&["stop", "date"]).passes().stderr_has("Stopped: date");
    playground.pgctl().args(&["stop", "date"]).passes().stderr_has("Already stopped: date");
}

#[test]
#[serial]
fn slow_ready_script_times_out() {
    require_s6!();
    let playground = Playground::new();
    playground.service("slow-startup", "#!/bin/sh\nexec pgctl-poll-ready sleep 60\n");
    playground.script("playground/slow-startup/ready", "#!/bin/sh\nsleep 6\n");

    let output = playground
        .pgctl()
        .env("PGCTL_TIMEOUT", "2")
        .args(&["start", "slow-startup"])
        .fails();
    assert!(
        output.stderr.contains("service 'slow-startup' failed to start after 2."),
        "stderr: {}",
        output.stderr
    );
    assert!(output.stderr.contains("Some services failed to start: slow-startup"));

    // the engine stops a service that failed to start
    let status = playground.pgctl().args(&["status", "slow-startup"]).passes();
    assert!(status.stdout.contains("down"), "status: {}", status.stdout);
}

#[test]
#[serial]
fn status_reports_ready_and_down() {
    require_s6!();
    let playground = Playground::new();
    playground.service("date", "#!/bin/sh\nexec sleep 60\n");

    playground.pgctl().args(&["start", "date"]).passes();
    playground
        .pgctl()
        .args(&["status", "date"])
        .passes()
        .stdout_has("date")
        .stdout_has("ready");

    let json = playground.pgctl().args(&["--json", "status", "date"]).passes();
    let parsed: serde_json::Value = serde_json::from_str(&json.stdout).expect("valid JSON");
    assert_eq!(parsed["date"]["state"], "ready");
    assert!(parsed["date"]["pid"].is_i64());

    playground.pgctl().args(&["stop", "date"]).passes();
    let json = playground.pgctl().args(&["--json", "status", "date"]).passes();
    let parsed: serde_json::Value = serde_json::from_str(&json.stdout).expect("valid JSON");
    assert_eq!(parsed["date"]["state"], "down");
}
