// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `pgctl` — configure and manage a playground of developer services.

mod app;
mod color;
mod commands;
mod configsearch;
mod exit_error;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use pgctl_core::CHANNEL;

use crate::app::PgctlApp;
use crate::exit_error::ExitError;

#[derive(Parser)]
#[command(name = "pgctl", version, about = "A tool to configure and manage developer playgrounds")]
pub struct Cli {
    /// show additional service action information
    #[arg(long, global = true)]
    verbose: bool,

    /// name the playground directory
    #[arg(long, global = true)]
    pgdir: Option<String>,

    /// directory to keep user-level playground state
    #[arg(long, global = true)]
    pghome: Option<String>,

    /// output in JSON (only supported by some commands)
    #[arg(long, global = true)]
    json: bool,

    /// no longer used; kept so old callers do not break
    #[arg(long, global = true, hide = true)]
    force: bool,

    /// do not force bad services to stop
    #[arg(long, global = true)]
    no_force: bool,

    /// specify a config file path to load
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Which services a command acts upon.
#[derive(Args, Clone, Default)]
pub struct ServiceSelection {
    /// act upon all services
    #[arg(short = 'a', long = "all", conflicts_with = "services")]
    all: bool,

    /// specify which services to act upon
    services: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Idempotent start of a service or group of services
    Start(ServiceSelection),
    /// Idempotent stop of a service or group of services
    Stop(ServiceSelection),
    /// Retrieve the PID and state of a service or group of services
    Status(ServiceSelection),
    /// Stop and start a service or group of services
    Restart(ServiceSelection),
    /// Reload the configuration for a service
    Reload(ServiceSelection),
    /// Display the stdout and stderr for a service or group of services
    Log(ServiceSelection),
    /// Run a service in the foreground
    Debug(ServiceSelection),
    /// Print the configuration
    Config(ServiceSelection),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (selection, run) = match &cli.command {
        Command::Start(s) => (s.clone(), commands::Kind::Start),
        Command::Stop(s) => (s.clone(), commands::Kind::Stop),
        Command::Status(s) => (s.clone(), commands::Kind::Status),
        Command::Restart(s) => (s.clone(), commands::Kind::Restart),
        Command::Reload(s) => (s.clone(), commands::Kind::Reload),
        Command::Log(s) => (s.clone(), commands::Kind::Log),
        Command::Debug(s) => (s.clone(), commands::Kind::Debug),
        Command::Config(s) => (s.clone(), commands::Kind::Config),
    };

    let app = match PgctlApp::from_cli(&cli, &selection) {
        Ok(app) => app,
        Err(err) => return render_error(err),
    };

    match commands::dispatch(run, &app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => render_error(err),
    }
}

fn render_error(err: ExitError) -> ExitCode {
    if err.user_level {
        // user errors get a single line, no backtrace
        eprintln!("{CHANNEL} ERROR: {}", err.message);
    } else {
        eprintln!("{}", err.message);
    }
    ExitCode::from(err.code)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "pgctl=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PGCTL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
