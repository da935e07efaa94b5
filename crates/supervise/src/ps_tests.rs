// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_pid_list_gives_empty_table() {
    assert_eq!(ps_table(&[]), "");
}

#[test]
fn own_pid_appears_in_the_table() {
    let table = ps_table(&[std::process::id() as i32]);
    assert!(table.contains(&std::process::id().to_string()), "table was: {table}");
}
