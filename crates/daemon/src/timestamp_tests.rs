// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn filter(input: &str) -> String {
    let mut output = Vec::new();
    let mut count = 0;
    prepend_timestamps(&mut input.as_bytes(), &mut output, || {
        count += 1;
        format!("[t{count}] ")
    })
    .unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn stamps_every_line() {
    assert_eq!(filter("one\ntwo\n"), "[t1] one\n[t2] two\n");
}

#[test]
fn partial_trailing_line_is_stamped_once() {
    assert_eq!(filter("one\npartial"), "[t1] one\n[t2] partial");
}

#[test]
fn empty_input_writes_nothing() {
    assert_eq!(filter(""), "");
}

#[test]
fn blank_lines_still_get_stamps() {
    assert_eq!(filter("\n\n"), "[t1] \n[t2] \n");
}

#[test]
fn timestamp_has_microsecond_precision() {
    let stamp = timestamp();
    // "2015-10-19 17:43:37.772152 "
    assert_eq!(stamp.len(), "2015-10-19 17:43:37.772152 ".len());
    assert!(stamp.ends_with(' '));
    assert!(stamp.contains('.'));
}
