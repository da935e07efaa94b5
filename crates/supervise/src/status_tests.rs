// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn parse(raw: &str) -> SvStatus {
    SvStatus::parse(raw).unwrap()
}

#[test]
fn up_with_ready_promotes_state_and_swaps_seconds() {
    let status = parse("up (pid 1202562) 100 seconds, ready 10 seconds\n");
    assert_eq!(status.state, SvState::Ready);
    assert_eq!(status.pid, Some(1202562));
    assert_eq!(status.seconds, Some(10));
    assert_eq!(status.process, None);
    assert_eq!(status.to_string(), "ready (pid 1202562) 10 seconds");
}

#[test]
fn plain_up() {
    let status = parse("up (pid 1202562) 100 seconds\n");
    assert_eq!(status.state, SvState::Up);
    assert_eq!(status.pid, Some(1202562));
    assert_eq!(status.seconds, Some(100));
    assert_eq!(status.to_string(), "up (pid 1202562) 100 seconds");
}

#[test]
fn down_wanting_up_is_starting() {
    let status = parse("down 4334 seconds, normally up, want up");
    assert_eq!(status.state, SvState::Down);
    assert_eq!(status.pid, None);
    assert_eq!(status.seconds, Some(4334));
    assert_eq!(status.process, Some(ProcessPhase::Starting));
    assert_eq!(status.to_string(), "down 4334 seconds, starting");
}

#[test]
fn down_with_exitcode_and_trailing_ready_stays_down() {
    let status = parse("down (exitcode 0) 0 seconds, normally up, want up, ready 0 seconds");
    assert_eq!(status.state, SvState::Down);
    assert_eq!(status.exitcode, Some(0));
    assert_eq!(status.seconds, Some(0));
    assert_eq!(status.process, Some(ProcessPhase::Starting));
    assert_eq!(status.to_string(), "down (exitcode 0) 0 seconds, starting");
}

#[test]
fn up_wanting_down_is_stopping() {
    let status = parse("up (pid 1202) 1 seconds, want down\n");
    assert_eq!(status.state, SvState::Up);
    assert_eq!(status.process, Some(ProcessPhase::Stopping));
    assert_eq!(status.to_string(), "up (pid 1202) 1 seconds, stopping");
}

#[test]
fn stray_nul_after_want_is_tolerated() {
    let status = parse("down 0 seconds, normally up, want up\u{0}");
    assert_eq!(status.process, Some(ProcessPhase::Starting));
}

#[test]
fn unexpected_want_value_is_a_hard_error() {
    let err = SvStatus::parse("up (pid 1) 1 seconds, want sideways").unwrap_err();
    assert_eq!(err, StatusParseError::UnexpectedWant("sideways".to_string()));
}

#[yare::parameterized(
    no_such_file = { "s6-svstat: fatal: unable to read status for wat: No such file or directory" },
    broken_pipe  = { "s6-svstat: fatal: unable to read status for sweet: Broken pipe\n" },
)]
fn fatal_probe_output_means_unsupervised(raw: &str) {
    let status = parse(raw);
    assert_eq!(status.state, SvState::Unsupervised);
    assert_eq!(status.to_string(), SvStatus::UNSUPERVISED);
}

#[test]
fn chdir_failure_is_invalid() {
    let status = parse("unable to chdir: file does not exist");
    assert_eq!(status.state, SvState::Invalid);
    assert_eq!(status.to_string(), SvStatus::INVALID);
}

#[test]
fn anything_else_is_unknown_with_no_fields() {
    let status = parse("totally unpredictable error message");
    assert_eq!(
        status.state,
        SvState::Unknown("totally unpredictable error message".to_string())
    );
    assert_eq!(status.pid, None);
    assert_eq!(status.exitcode, None);
    assert_eq!(status.seconds, None);
    assert_eq!(status.process, None);
}

#[test]
fn down_without_want_has_no_process() {
    let status = parse("down 0 seconds, normally up");
    assert_eq!(status.state, SvState::Down);
    assert_eq!(status.process, None);
    assert_eq!(status.to_string(), "down 0 seconds");
}

#[yare::parameterized(
    up           = { "up (pid 9) 3 seconds", "up" },
    ready        = { "up (pid 9) 3 seconds, ready 1 seconds", "ready" },
    down         = { "down 3 seconds, normally up", "down" },
    unsupervised = { "s6-svstat: fatal: unable to read status for x: Broken pipe", "down" },
)]
fn user_state_collapses_unsupervised(raw: &str, expected: &str) {
    assert_eq!(parse(raw).user_state(), expected);
}

/// Equal records render identically; distinct records render distinctly.
/// Display is the record identity used in operator-facing messages.
#[test]
fn display_is_a_faithful_record_identity() {
    let a = parse("up (pid 7) 12 seconds, ready 3 seconds");
    let b = parse("up (pid 7) 999 seconds, ready 3 seconds");
    assert_eq!(a, b.clone());
    assert_eq!(a.to_string(), b.to_string());

    let c = parse("up (pid 7) 3 seconds");
    assert_ne!(a, c);
    assert_ne!(a.to_string(), c.to_string());
}
