// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-changing commands: start, stop, restart, reload.

use pgctl_core::UserError;
use pgctl_engine::{commafy, pgctl_print};

use crate::app::PgctlApp;
use crate::exit_error::ExitError;

pub async fn start(app: &PgctlApp) -> Result<(), ExitError> {
    app.engine()?.start().await?;
    Ok(())
}

pub async fn stop(app: &PgctlApp) -> Result<(), ExitError> {
    app.engine()?.stop(false).await?;
    Ok(())
}

pub async fn restart(app: &PgctlApp) -> Result<(), ExitError> {
    app.engine()?.restart().await?;
    Ok(())
}

pub fn reload(app: &PgctlApp) -> Result<(), ExitError> {
    let names: Vec<String> =
        app.services()?.iter().map(|service| service.name().to_string()).collect();
    pgctl_print(&format!("reload: {}", commafy(&names)));
    Err(UserError::message("reloading is not yet implemented.").into())
}
