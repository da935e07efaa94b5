// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status command handler

use std::collections::BTreeMap;

use pgctl_supervise::SvStatus;

use crate::app::PgctlApp;
use crate::color;
use crate::exit_error::ExitError;

pub async fn status(app: &PgctlApp) -> Result<(), ExitError> {
    let statuses = app.engine()?.statuses().await?;

    if app.config.json {
        let mut by_name = BTreeMap::new();
        for (name, status) in &statuses {
            by_name.insert(name.clone(), status_json(status));
        }
        println!("{}", serde_json::to_string_pretty(&by_name).map_err(std::io::Error::from)?);
        return Ok(());
    }

    let colorize = color::should_colorize();
    let mut sorted = statuses;
    sorted.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (name, status) in sorted {
        let state = status.user_state().to_string();
        let bullet = match color::state_color(&state) {
            Some(style) => color::wrap("\u{25cf}", style, colorize),
            None => "\u{25cf}".to_string(),
        };
        let styled_state = match color::state_color(&state) {
            Some(style) => color::wrap(&state, &format!("{}{style}", color::BOLD), colorize),
            None => state.clone(),
        };
        println!(" {} {}: {}", bullet, color::wrap(&name, color::BOLD, colorize), styled_state);

        let mut components = Vec::new();
        if let Some(pid) = status.pid {
            components.push(format!("pid: {pid}"));
        }
        if let Some(exitcode) = status.exitcode {
            components.push(format!("exitcode: {exitcode}"));
        }
        if let Some(seconds) = status.seconds {
            components.push(humanize_seconds(seconds));
        }
        if let Some(process) = status.process_label() {
            components.push(process.to_string());
        }
        if !components.is_empty() {
            println!("   \u{2514}\u{2500} {}", components.join(", "));
        }
    }
    Ok(())
}

fn status_json(status: &SvStatus) -> serde_json::Value {
    serde_json::json!({
        "state": status.user_state(),
        "pid": status.pid,
        "exitcode": status.exitcode,
        "seconds": status.seconds,
        "process": status.process_label(),
    })
}

fn humanize_seconds(seconds: i64) -> String {
    for (period_name, period_length) in
        [("days", 24 * 60 * 60), ("hours", 60 * 60), ("minutes", 60)]
    {
        if seconds >= period_length {
            return format!("{:.1} {}", seconds as f64 / period_length as f64, period_name);
        }
    }
    format!("{seconds} seconds")
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
