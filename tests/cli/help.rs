//! CLI surface specs
//!
//! Usage, help, version, and exit-code conventions.

use crate::prelude::*;

#[test]
fn no_arguments_is_a_usage_error() {
    let playground = Playground::new();
    let output = playground.pgctl().run();
    assert_eq!(output.code, 2);
}

#[test]
fn unknown_command_is_a_usage_error() {
    let playground = Playground::new();
    let output = playground.pgctl().args(&["frobnicate"]).run();
    assert_eq!(output.code, 2);
}

#[test]
fn help_lists_the_commands() {
    let playground = Playground::new();
    playground
        .pgctl()
        .args(&["--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status")
        .stdout_has("restart")
        .stdout_has("log")
        .stdout_has("debug")
        .stdout_has("config");
}

#[test]
fn version_prints() {
    let playground = Playground::new();
    playground.pgctl().args(&["--version"]).passes().stdout_has("pgctl");
}

#[test]
fn all_flag_conflicts_with_service_names() {
    let playground = Playground::new();
    let output = playground.pgctl().args(&["start", "--all", "web"]).run();
    assert_eq!(output.code, 2);
}

#[test]
fn reload_is_not_implemented() {
    let playground = Playground::new();
    playground.service("date", "#!/bin/sh\nexec sleep 60\n");
    playground
        .pgctl()
        .args(&["reload"])
        .fails()
        .stderr_has("[pgctl] reload: date")
        .stderr_has("[pgctl] ERROR: reloading is not yet implemented.");
}

#[test]
fn status_of_an_empty_playground_is_quiet() {
    let playground = Playground::new();
    let output = playground.pgctl().args(&["status"]).passes();
    assert_eq!(output.stdout, "");
}
