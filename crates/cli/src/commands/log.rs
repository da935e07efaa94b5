// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log command: replace ourselves with `tail` over the services' logs.

use std::io::IsTerminal;
use std::os::unix::process::CommandExt;

use pgctl_engine::bestrelpath;

use crate::app::PgctlApp;
use crate::exit_error::ExitError;

pub fn log(app: &PgctlApp) -> Result<(), ExitError> {
    exec_tail(app, std::io::stdout().is_terminal())
}

/// Interactive sessions follow; pipes get a plain 30-line dump. Never
/// returns on success — the process becomes `tail`.
pub fn exec_tail(app: &PgctlApp, interactive: bool) -> Result<(), ExitError> {
    let mut command = std::process::Command::new("tail");
    command.args(["-n", "30", "--verbose"]);
    if interactive {
        command.args(["--follow=name", "--retry"]);
    }

    for service in app.services()? {
        service.ensure_logs()?;
        command.arg(bestrelpath(&service.logfile_path()));
    }

    let err = command.exec();
    Err(err.into())
}
