// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn circular_alias_message_matches_cli_contract() {
    let err = UserError::CircularAliases { name: "a".to_string() };
    assert_eq!(
        err.to_string(),
        "Circular aliases! Visited twice during alias expansion: 'a'"
    );
}

#[test]
fn no_playground_names_the_directory() {
    let err = UserError::NoPlayground { pgdir: "playground".to_string() };
    assert_eq!(err.to_string(), "could not find any directory named 'playground'");
}

#[test]
fn failures_lists_services() {
    let err = UserError::Failures { action: "start", failed: "a, b".to_string() };
    assert_eq!(err.to_string(), "Some services failed to start: a, b");
}

#[yare::parameterized(
    not_ready    = { UserError::NotReady { expected: "ready", status: "down".to_string() }, true },
    unsupervised = { UserError::Unsupervised, true },
    lock_held    = { UserError::LockHeld { message: String::new() }, true },
    no_service   = { UserError::NoSuchService { name: "x".to_string() }, false },
    failures     = { UserError::Failures { action: "stop", failed: String::new() }, false },
)]
fn retryable_classification(err: UserError, expected: bool) {
    assert_eq!(err.is_retryable(), expected);
}
