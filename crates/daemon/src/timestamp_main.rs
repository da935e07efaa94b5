// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pgctl-timestamp` — prepend a timestamp to every log line.
//!
//! With no arguments, filters stdin to stdout and exits at EOF. With an
//! input path and an output path (the logger sidecar's mode), it keeps
//! reopening the input — a FIFO — so the log survives any number of writer
//! generations, appending stamped lines to the output file.

use std::process::ExitCode;

use pgctl_daemon::timestamp::{prepend_timestamps, timestamp};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            let mut stdin = std::io::stdin().lock();
            let mut stdout = std::io::stdout().lock();
            match prepend_timestamps(&mut stdin, &mut stdout, timestamp) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("pgctl-timestamp: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        [input, output] => match run_logger(input, output) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("pgctl-timestamp: {err}");
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("usage: pgctl-timestamp [INPUT-FIFO OUTPUT-FILE]");
            ExitCode::from(2)
        }
    }
}

fn run_logger(input: &str, output: &str) -> std::io::Result<()> {
    let mut sink = std::fs::OpenOptions::new().append(true).create(true).open(output)?;
    loop {
        // Opening the FIFO blocks until a writer appears; EOF means every
        // writer closed, so go back and wait for the next generation.
        let mut source = std::fs::File::open(input)?;
        prepend_timestamps(&mut source, &mut sink, timestamp)?;
    }
}
