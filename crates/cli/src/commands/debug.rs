// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Debug command: run a single service in the foreground.

use pgctl_core::UserError;

use crate::app::PgctlApp;
use crate::exit_error::ExitError;

pub async fn debug(app: &PgctlApp) -> Result<(), ExitError> {
    let services = app.services()?;
    let [service] = services.as_slice() else {
        let names: Vec<String> = services.iter().map(|s| s.name().to_string()).collect();
        return Err(UserError::message(format!(
            "Must debug exactly one service, not: {}",
            names.join(", "),
        ))
        .into());
    };

    // a supervised copy would fight us for the service
    service.ensure_exists()?;
    if service.status().await?.user_state() != "down" {
        app.engine()?.stop(false).await?;
    }

    app.engine()?.run_playground_hook("pre-start")?;

    // exec into the run script; Ctrl-C lands on the service, not on us
    Err(service.foreground().into())
}
