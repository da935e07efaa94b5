// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

mod config;
mod debug;
mod log;
mod state;
mod status;

use crate::app::PgctlApp;
use crate::exit_error::ExitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Start,
    Stop,
    Status,
    Restart,
    Reload,
    Log,
    Debug,
    Config,
}

pub async fn dispatch(kind: Kind, app: &PgctlApp) -> Result<(), ExitError> {
    match kind {
        Kind::Start => state::start(app).await,
        Kind::Stop => state::stop(app).await,
        Kind::Restart => state::restart(app).await,
        Kind::Reload => state::reload(app),
        Kind::Status => status::status(app).await,
        Kind::Log => log::log(app),
        Kind::Debug => debug::debug(app).await,
        Kind::Config => config::config(app),
    }
}
