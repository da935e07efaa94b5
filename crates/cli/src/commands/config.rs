// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config command: dump the merged configuration as JSON.

use crate::app::PgctlApp;
use crate::exit_error::ExitError;

pub fn config(app: &PgctlApp) -> Result<(), ExitError> {
    let value = serde_json::to_value(&app.config).map_err(std::io::Error::from)?;
    // sorted keys, like the rest of our JSON output
    let sorted: std::collections::BTreeMap<String, serde_json::Value> = match value {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        other => {
            println!("{other}");
            return Ok(());
        }
    };
    println!("{}", serde_json::to_string_pretty(&sorted).map_err(std::io::Error::from)?);
    Ok(())
}
