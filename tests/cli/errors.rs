//! User-error reporting specs
//!
//! User-level failures are a single `[pgctl] ERROR:` line and exit 1.

use crate::prelude::*;

#[test]
fn missing_playground_is_reported() {
    let project = Playground::empty();
    project
        .pgctl()
        .args(&["start"])
        .fails()
        .stderr_has("[pgctl] ERROR: could not find any directory named 'playground'");
}

#[test]
fn missing_service_is_reported() {
    let playground = Playground::new();
    playground.service("real", "#!/bin/sh\nexec sleep 60\n");
    playground
        .pgctl()
        .args(&["start", "imaginary"])
        .fails()
        .stderr_has("[pgctl] ERROR: no such playground service: 'imaginary'");
}

#[test]
fn circular_aliases_are_reported() {
    let playground = Playground::new();
    playground.service("date", "#!/bin/sh\nexec sleep 60\n");
    playground.file(
        ".pgctl.toml",
        r#"
[aliases]
a = ["b"]
b = ["a"]
"#,
    );

    playground.pgctl().args(&["start", "a"]).fails().stderr_has(
        "ERROR: Circular aliases! Visited twice during alias expansion: 'a'",
    );
}

#[test]
fn debug_requires_exactly_one_service() {
    let playground = Playground::new();
    playground.service("a", "#!/bin/sh\nexec sleep 60\n");
    playground.service("b", "#!/bin/sh\nexec sleep 60\n");
    playground
        .pgctl()
        .args(&["debug", "a", "b"])
        .fails()
        .stderr_has("Must debug exactly one service, not: a, b");
}
