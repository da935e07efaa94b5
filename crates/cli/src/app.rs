// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolved invocation context: configuration, playground, services.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pgctl_core::{expand_aliases, unique, Config, ConfigOverlay, UserError, ALL_SERVICES};
use pgctl_engine::{log_viewer_enabled, EngineOptions, Service, StateChangeEngine};

use crate::configsearch::{configsearch, search_parent_directories};
use crate::exit_error::ExitError;
use crate::{Cli, ServiceSelection};

pub struct PgctlApp {
    pub config: Config,
    pghome: PathBuf,
}

impl PgctlApp {
    /// Layer the configuration: defaults ← config files ← `PGCTL_*`
    /// environment ← CLI flags.
    pub fn from_cli(cli: &Cli, selection: &ServiceSelection) -> Result<Self, ExitError> {
        let xdg_runtime_dir = std::env::var("XDG_RUNTIME_DIR").ok();
        let mut config = Config::defaults(xdg_runtime_dir.as_deref());

        for path in config_files(cli) {
            let text = std::fs::read_to_string(&path)?;
            config.apply(ConfigOverlay::from_toml(&text)?);
        }

        config.apply(ConfigOverlay::from_env(std::env::vars())?);
        config.apply(cli_overlay(cli, selection));

        let home = std::env::var("HOME").ok();
        let pghome = PathBuf::from(config.pghome_expanded(home.as_deref()));
        Ok(PgctlApp { config, pghome })
    }

    /// The playground directory: the nearest ancestor of the working
    /// directory containing a directory with the configured name.
    pub fn pgdir(&self) -> Result<PathBuf, ExitError> {
        let cwd = std::env::current_dir()?;
        for parent in search_parent_directories(&cwd) {
            let candidate = parent.join(&self.config.pgdir);
            if candidate.is_dir() {
                return Ok(candidate);
            }
        }
        Err(UserError::NoPlayground { pgdir: self.config.pgdir.clone() }.into())
    }

    /// An instantiated Service, by name (absolute paths welcome).
    pub fn service_by_name(&self, name: &str) -> Result<Service, ExitError> {
        let path = if Path::new(name).is_absolute() {
            PathBuf::from(name)
        } else {
            self.pgdir()?.join(name)
        };
        // scratch mirrors the service's absolute path under pghome
        let relative = path.strip_prefix("/").unwrap_or(&path);
        let scratch = self.pghome.join(relative);
        Ok(Service::new(path, scratch, self.config.timeout))
    }

    /// The services this command acts upon: aliases expanded, duplicates
    /// dropped (first occurrence wins).
    pub fn services(&self) -> Result<Vec<Service>, ExitError> {
        let all_names = self.all_service_names()?;
        let mut names = Vec::new();
        for requested in &self.config.services {
            names.extend(expand_aliases(&self.config.aliases, requested, &all_names)?);
        }
        unique(names).iter().map(|name| self.service_by_name(name)).collect()
    }

    /// Every subdirectory of the playground, sorted.
    pub fn all_services(&self) -> Result<Vec<Service>, ExitError> {
        self.all_service_names()?
            .iter()
            .map(|name| self.service_by_name(name))
            .collect()
    }

    fn all_service_names(&self) -> Result<Vec<String>, ExitError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(self.pgdir()?)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn engine(&self) -> Result<StateChangeEngine, ExitError> {
        Ok(StateChangeEngine::new(
            self.pgdir()?,
            self.services()?,
            self.all_services()?,
            EngineOptions {
                poll: Duration::from_secs_f64(self.config.poll.max(0.0)),
                force: !self.config.no_force,
                verbose: self.config.verbose,
                log_viewer: log_viewer_enabled(std::io::stderr().is_terminal(), |name| {
                    std::env::var(name).ok()
                }),
            },
        ))
    }
}

/// Config files, outermost layer first: user-level, then the nearest
/// app-level `.pgctl.toml` found walking up from the working directory.
fn config_files(cli: &Cli) -> Vec<PathBuf> {
    if let Some(explicit) = &cli.config {
        return vec![explicit.clone()];
    }

    let mut files = Vec::new();
    if let Ok(home) = std::env::var("HOME") {
        let user_level = Path::new(&home).join(".config").join("pgctl.toml");
        if user_level.exists() {
            files.push(user_level);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(app_level) = configsearch(&cwd, ".pgctl.toml").into_iter().next() {
            files.push(app_level);
        }
    }
    files
}

fn cli_overlay(cli: &Cli, selection: &ServiceSelection) -> ConfigOverlay {
    ConfigOverlay {
        pgdir: cli.pgdir.clone(),
        pghome: cli.pghome.clone(),
        services: if selection.all {
            Some(vec![ALL_SERVICES.to_string()])
        } else if selection.services.is_empty() {
            None
        } else {
            Some(selection.services.clone())
        },
        timeout: None,
        poll: None,
        aliases: None,
        json: cli.json.then_some(true),
        no_force: cli.no_force.then_some(true),
        verbose: cli.verbose.then_some(true),
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
