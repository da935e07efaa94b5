// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-timestamping log filter.
//!
//! Format matches daemontools' `tai64nlocal` output:
//!
//! ```text
//! 2015-10-19 17:43:37.772152500
//! ```
//!
//! The stamp is emitted lazily at the first byte after each newline, so a
//! partially-written line gets the time its first byte arrived, not the time
//! the line completed.

use std::io::{Read, Write};

use chrono::Local;

/// The current local time in log-prefix form.
pub fn timestamp() -> String {
    Local::now().format("%F %T%.6f ").to_string()
}

/// Copy `input` to `output`, prepending a timestamp to every line.
///
/// Returns on EOF. The caller decides whether EOF is final (stdin mode) or
/// means "reopen the FIFO and keep going" (logger mode).
pub fn prepend_timestamps(
    input: &mut impl Read,
    output: &mut impl Write,
    mut stamp: impl FnMut() -> String,
) -> std::io::Result<()> {
    let mut buffer = [0u8; 4096];
    let mut needstamp = true;
    loop {
        let read = match input.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        for byte in &buffer[..read] {
            if needstamp {
                output.write_all(stamp().as_bytes())?;
                needstamp = false;
            }
            output.write_all(std::slice::from_ref(byte))?;
            if *byte == b'\n' {
                needstamp = true;
            }
        }
        output.flush()?;
    }
}

#[cfg(test)]
#[path = "timestamp_tests.rs"]
mod tests;
