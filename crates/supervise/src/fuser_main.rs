// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pgctl-fuser` — print the pids holding an open descriptor to each path.

use std::path::Path;

fn main() {
    for arg in std::env::args().skip(1) {
        for pid in pgctl_supervise::fuser(Path::new(&arg), false) {
            println!("{pid}");
        }
    }
}
