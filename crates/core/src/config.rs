// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered configuration model.
//!
//! Precedence, lowest first: built-in defaults, an app-level config file,
//! `PGCTL_*` environment variables, CLI flags. Each layer is expressed as a
//! [`ConfigOverlay`] applied on top of the accumulated [`Config`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::alias::ALL_SERVICES;
use crate::errors::UserError;

/// Fully-resolved configuration for one pgctl invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Name of the playground directory to search for.
    pub pgdir: String,
    /// Directory that holds per-service scratch state (may contain `~`).
    pub pghome: String,
    /// Which services (or aliases) the command acts upon.
    pub services: Vec<String>,
    /// Default seconds to wait for a service to come up or down.
    pub timeout: f64,
    /// Seconds between polling-loop ticks.
    pub poll: f64,
    /// Named groups of services.
    pub aliases: IndexMap<String, Vec<String>>,
    /// Output as JSON (status only).
    pub json: bool,
    /// Do not SIGKILL processes that outlive the graceful stop window.
    pub no_force: bool,
    /// Extra state-change output.
    pub verbose: bool,
}

impl Config {
    /// Built-in defaults; `xdg_runtime_dir` feeds the pghome fallback chain.
    pub fn defaults(xdg_runtime_dir: Option<&str>) -> Self {
        let runtime_dir = match xdg_runtime_dir {
            Some(dir) if !dir.is_empty() => dir.to_string(),
            _ => "~/.run".to_string(),
        };
        let mut aliases = IndexMap::new();
        aliases.insert("default".to_string(), vec![ALL_SERVICES.to_string()]);
        Config {
            pgdir: "playground".to_string(),
            pghome: format!("{runtime_dir}/pgctl"),
            services: vec!["default".to_string()],
            timeout: 2.0,
            poll: 0.01,
            aliases,
            json: false,
            no_force: false,
            verbose: false,
        }
    }

    /// Apply one overlay, later layers winning field by field.
    pub fn apply(&mut self, overlay: ConfigOverlay) {
        if let Some(pgdir) = overlay.pgdir {
            self.pgdir = pgdir;
        }
        if let Some(pghome) = overlay.pghome {
            self.pghome = pghome;
        }
        if let Some(services) = overlay.services {
            if !services.is_empty() {
                self.services = services;
            }
        }
        if let Some(timeout) = overlay.timeout {
            self.timeout = timeout;
        }
        if let Some(poll) = overlay.poll {
            self.poll = poll;
        }
        if let Some(aliases) = overlay.aliases {
            self.aliases = aliases;
        }
        if let Some(json) = overlay.json {
            self.json = json;
        }
        if let Some(no_force) = overlay.no_force {
            self.no_force = no_force;
        }
        if let Some(verbose) = overlay.verbose {
            self.verbose = verbose;
        }
    }

    /// Expand a leading `~` in pghome using `home`.
    pub fn pghome_expanded(&self, home: Option<&str>) -> String {
        match (self.pghome.strip_prefix("~/"), home) {
            (Some(rest), Some(home)) => format!("{home}/{rest}"),
            _ => self.pghome.clone(),
        }
    }
}

/// One configuration layer; unset fields defer to the layers below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    pub pgdir: Option<String>,
    pub pghome: Option<String>,
    pub services: Option<Vec<String>>,
    pub timeout: Option<f64>,
    pub poll: Option<f64>,
    pub aliases: Option<IndexMap<String, Vec<String>>>,
    pub json: Option<bool>,
    pub no_force: Option<bool>,
    pub verbose: Option<bool>,
}

impl ConfigOverlay {
    /// Parse a TOML config file's contents.
    pub fn from_toml(text: &str) -> Result<Self, UserError> {
        toml::from_str(text)
            .map_err(|err| UserError::message(format!("bad config file: {err}")))
    }

    /// Build an overlay from `PGCTL_*` environment variables.
    ///
    /// Only the documented settings are read; other `PGCTL_` names (e.g.
    /// `PGCTL_DEBUG`, `PGCTL_SCRATCH`) belong to subprocess plumbing and are
    /// ignored here. Services are whitespace-separated.
    pub fn from_env(
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, UserError> {
        let mut overlay = ConfigOverlay::default();
        for (key, value) in vars {
            match key.as_str() {
                "PGCTL_PGDIR" => overlay.pgdir = Some(value),
                "PGCTL_PGHOME" => overlay.pghome = Some(value),
                "PGCTL_TIMEOUT" => overlay.timeout = Some(parse_seconds(&key, &value)?),
                "PGCTL_POLL" => overlay.poll = Some(parse_seconds(&key, &value)?),
                "PGCTL_SERVICES" => {
                    overlay.services =
                        Some(value.split_whitespace().map(str::to_string).collect());
                }
                _ => {}
            }
        }
        Ok(overlay)
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<f64, UserError> {
    value
        .parse::<f64>()
        .map_err(|_| UserError::message(format!("{key} is not a number: '{value}'")))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
