// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The state-change engine.
//!
//! Drives N services from an observed state to a requested state under the
//! playground-wide lock. Two locking phases: a short one for the "already
//! there" fast path, then (after any pre-start hook, which may be slow and
//! runs unlocked) a long one for the polling loop itself.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use pgctl_core::{deadline, Clock, SystemClock, UserError, CHANNEL};
use pgctl_supervise::{fuser, ps::ps_table, svstat, Flock, FlockError, SvStatus};
use tracing::{debug, trace};

use crate::errors::EngineError;
use crate::output::{bestrelpath, commafy, pgctl_print, tail_lines};
use crate::service::Service;
use crate::state_change::{StateChange, TransitionResult};
use crate::viewer::LogViewer;

/// Rows the interactive log panel occupies (title excluded).
pub const LOG_VIEWER_HEIGHT: usize = 12;

/// Lines of a failed service's log replayed onto stderr.
const FAILURE_TAIL_LINES: usize = 30;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Seconds between polling ticks.
    pub poll: Duration,
    /// SIGKILL runaways once the graceful window elapses.
    pub force: bool,
    /// Also narrate non-user-facing transitions (StopLogs).
    pub verbose: bool,
    /// Render the live log panel during transitions.
    pub log_viewer: bool,
}

pub struct StateChangeEngine<C: Clock = SystemClock> {
    playground: PathBuf,
    services: Vec<Service>,
    all_services: Vec<Service>,
    options: EngineOptions,
    clock: C,
}

impl StateChangeEngine<SystemClock> {
    pub fn new(
        playground: PathBuf,
        services: Vec<Service>,
        all_services: Vec<Service>,
        options: EngineOptions,
    ) -> Self {
        Self::with_clock(playground, services, all_services, options, SystemClock)
    }
}

impl<C: Clock> StateChangeEngine<C> {
    pub fn with_clock(
        playground: PathBuf,
        services: Vec<Service>,
        all_services: Vec<Service>,
        options: EngineOptions,
        clock: C,
    ) -> Self {
        StateChangeEngine { playground, services, all_services, options, clock }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    // -----------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------

    /// Idempotent start of the service set.
    pub async fn start(&self) -> Result<(), EngineError> {
        let failed = self.change_state(StateChange::Start, &self.services).await?;
        self.show_failure(StateChange::Start, failed).await
    }

    /// Idempotent stop. `with_log_running` leaves the logger sidecars up so
    /// a following start lands in the same log file.
    pub async fn stop(&self, with_log_running: bool) -> Result<(), EngineError> {
        let mut failed = self.change_state(StateChange::Stop, &self.services).await?;

        if !with_log_running {
            let survivors: Vec<Service> = self
                .services
                .iter()
                .filter(|service| !failed.iter().any(|name| name == service.name()))
                .cloned()
                .collect();
            failed.extend(self.change_state(StateChange::StopLogs, &survivors).await?);
        }

        self.show_failure(StateChange::Stop, failed).await
    }

    /// Stop (logger left running) then start.
    pub async fn restart(&self) -> Result<(), EngineError> {
        self.stop(true).await?;
        self.start().await
    }

    /// Observed status of each service, in input order.
    pub async fn statuses(&self) -> Result<Vec<(String, SvStatus)>, EngineError> {
        let mut statuses = Vec::with_capacity(self.services.len());
        for service in &self.services {
            service.ensure_exists()?;
            statuses.push((service.name().to_string(), service.status().await?));
        }
        Ok(statuses)
    }

    /// Run a playground-wide hook if it exists. Hooks run with the
    /// playground's parent as cwd and no lock held (they can be slow).
    pub fn run_playground_hook(&self, name: &str) -> Result<(), EngineError> {
        let hook = self.playground.join(name);
        if !hook.exists() {
            return Ok(());
        }
        let cwd = self.playground.parent().unwrap_or(&self.playground);
        debug!("running {name} hook");
        let status = std::process::Command::new(&hook).current_dir(cwd).status()?;
        if !status.success() {
            return Err(UserError::message(format!("the {name} hook failed ({status})")).into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Locking
    // -----------------------------------------------------------------

    /// Lock the entire playground: every target service's `.pgctl.lock`,
    /// marked non-inheritable so children never keep it alive. Contention is
    /// immediately fatal with a "who holds it" diagnosis.
    fn playground_locked(&self) -> Result<Vec<Flock>, EngineError> {
        let mut locks = Vec::with_capacity(self.services.len());
        for service in &self.services {
            service.ensure_exists()?;
            let lock = Flock::acquire(&service.lock_path(), |path| {
                Err(FlockError::Held {
                    message: format!(
                        "another pgctl command is currently managing this service: ({})\n{}",
                        bestrelpath(path),
                        ps_table(&fuser(path, false)),
                    ),
                })
            })?;
            lock.set_inheritable(false)?;
            locks.push(lock);
        }
        Ok(locks)
    }

    // -----------------------------------------------------------------
    // The transition
    // -----------------------------------------------------------------

    async fn change_state(
        &self,
        change: StateChange,
        services: &[Service],
    ) -> Result<Vec<String>, EngineError> {
        if services.is_empty() {
            return Ok(Vec::new());
        }

        // Short lock: if every assertion already passes there is nothing to
        // do, and we must not run hooks or touch supervisors.
        {
            let _locks = self.playground_locked()?;
            let mut satisfied = true;
            for service in services {
                match change.assert(service).await {
                    Ok(()) => {}
                    Err(EngineError::User(_)) => {
                        satisfied = false;
                        break;
                    }
                    Err(other) => return Err(other),
                }
            }
            if satisfied {
                if self.displays(change) {
                    pgctl_print(&format!(
                        "Already {} {}",
                        change.changed().to_lowercase(),
                        commafy(&service_names(services)),
                    ));
                }
                return Ok(Vec::new());
            }
        }

        if change == StateChange::Start {
            self.run_playground_hook("pre-start")?;
        }

        let mut run_post_stop = false;
        let failed;
        {
            let _locks = self.playground_locked()?;
            failed = self.locked_change_state(change, services).await?;
            if change == StateChange::Stop {
                run_post_stop = self.playground_is_down().await?;
            }
        }

        if run_post_stop {
            self.run_playground_hook("post-stop")?;
        }
        Ok(failed)
    }

    /// The critical section: drive every service to the target state, each
    /// against its own deadline, all at the polling cadence.
    async fn locked_change_state(
        &self,
        change: StateChange,
        services: &[Service],
    ) -> Result<Vec<String>, EngineError> {
        if self.displays(change) {
            pgctl_print(&format!("{} {}", change.changing(), commafy(&service_names(services))));
        }

        let mut viewer = self.make_viewer(services)?;
        let mut pending: Vec<&Service> = services.iter().collect();
        let mut failed: Vec<String> = Vec::new();
        let start_time = self.clock.now();

        while !pending.is_empty() {
            // Within one tick every change() happens before any assertion.
            for service in &pending {
                match change.change(service).await {
                    Ok(()) => {}
                    // handled by the state assertion below
                    Err(EngineError::User(UserError::Unsupervised)) => {}
                    Err(other) => return Err(other),
                }
            }

            let mut announcements: Vec<String> = Vec::new();
            let mut still_pending: Vec<&Service> = Vec::new();
            for service in pending.drain(..) {
                let check_time = self.clock.now();
                let result = match change.assert(service).await {
                    Ok(()) => TransitionResult::Success,
                    Err(EngineError::User(err)) => {
                        self.handle_not_yet(change, service, &err, start_time, check_time)?
                    }
                    Err(other) => return Err(other),
                };
                match result {
                    TransitionResult::Success => {
                        trace!("loop: check took {:?}", self.clock.now() - check_time);
                        if self.displays(change) {
                            announcements.push(format!("{} {}", change.changed(), service.name()));
                        }
                        if let Some(message) = service.message(change.verb())? {
                            print!("{message}");
                        }
                        if let Some(viewer) = viewer.as_mut() {
                            viewer.stop_tailing(service.name());
                        }
                    }
                    TransitionResult::Failure(message) => {
                        announcements.push(message);
                        failed.push(service.name().to_string());
                    }
                    TransitionResult::RecheckNeeded => still_pending.push(service),
                }
            }
            pending = still_pending;

            self.emit_tick(viewer.as_mut(), announcements, change, &pending, start_time);
            if pending.is_empty() {
                break;
            }
            tokio::time::sleep(self.options.poll).await;
        }

        if let Some(viewer) = viewer.as_mut() {
            let reposition = viewer.move_cursor_to_top();
            if !reposition.is_empty() {
                write_stderr(&format!("{reposition}{}", viewer.clear_below()));
            }
            viewer.cleanup();
        }
        Ok(failed)
    }

    /// An assertion failed: still waiting, or out of time (with optional
    /// forced cleanup, which earns a recheck instead of a verdict).
    fn handle_not_yet(
        &self,
        change: StateChange,
        service: &Service,
        error: &UserError,
        start_time: std::time::Instant,
        check_time: std::time::Instant,
    ) -> Result<TransitionResult, EngineError> {
        let now = self.clock.now();
        let timeout = change.timeout(service);

        if !deadline::deadline_reached(timeout, start_time, check_time, now) {
            trace!(
                "service {} still waiting: {:.1?}",
                service.name(),
                deadline::remaining(timeout, start_time, now),
            );
            return Ok(TransitionResult::RecheckNeeded);
        }

        if self.options.force {
            if let Some(warning) = change.force(service)? {
                pgctl_print(&warning);
                return Ok(TransitionResult::RecheckNeeded);
            }
        }

        let elapsed = now.duration_since(start_time).as_secs_f64();
        let mut message = format!(
            "ERROR: service '{}' failed to {} after {:.2} seconds",
            service.name(),
            change.verb(),
            elapsed,
        );
        if elapsed - timeout.as_secs_f64() > 0.1 {
            message.push_str(&format!(
                " (it took {:.2}s to poll)",
                now.duration_since(check_time).as_secs_f64(),
            ));
        }
        message.push_str(&format!(", {error}"));
        Ok(TransitionResult::Failure(message))
    }

    // -----------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------

    fn displays(&self, change: StateChange) -> bool {
        change.is_user_facing() || self.options.verbose
    }

    fn make_viewer(&self, services: &[Service]) -> Result<Option<LogViewer>, EngineError> {
        if !self.options.log_viewer {
            return Ok(None);
        }
        for service in services {
            service.ensure_logs()?;
        }
        let map = services
            .iter()
            .map(|service| (service.name().to_string(), service.logfile_path()))
            .collect();
        Ok(Some(LogViewer::new(LOG_VIEWER_HEIGHT, map)?))
    }

    /// One tick's worth of output. With the viewer active, everything —
    /// cursor reposition, announcements, the redrawn panel — goes out in a
    /// single write so the terminal never shows a half-frame.
    fn emit_tick(
        &self,
        viewer: Option<&mut LogViewer>,
        announcements: Vec<String>,
        change: StateChange,
        pending: &[&Service],
        start_time: std::time::Instant,
    ) {
        let Some(viewer) = viewer else {
            for line in announcements {
                pgctl_print(&line);
            }
            return;
        };

        if announcements.is_empty() && !viewer.redraw_needed() {
            return;
        }

        let mut frame = viewer.move_cursor_to_top();
        frame.push_str(&viewer.clear_below());
        for line in &announcements {
            frame.push_str(&format!("{CHANNEL} {line}\n"));
        }
        if !pending.is_empty() {
            let now = self.clock.now();
            let remaining = pending
                .iter()
                .map(|service| deadline::remaining(change.timeout(service), start_time, now))
                .max()
                .unwrap_or(Duration::ZERO);
            let title = format!(
                "{CHANNEL} Still {} {} ({:.1}s)",
                change.changing().to_lowercase(),
                commafy(&pending.iter().map(|s| s.name().to_string()).collect::<Vec<_>>()),
                remaining.as_secs_f64(),
            );
            frame.push_str(&viewer.draw_logs(&title));
        }
        write_stderr(&frame);
    }

    /// Replay failed services' log tails, clean up half-started services,
    /// and surface the one-line failure summary.
    async fn show_failure(
        &self,
        change: StateChange,
        failed: Vec<String>,
    ) -> Result<(), EngineError> {
        if failed.is_empty() {
            return Ok(());
        }

        let failed_services: Vec<&Service> = self
            .services
            .iter()
            .filter(|service| failed.iter().any(|name| name == service.name()))
            .collect();

        for service in &failed_services {
            let logfile = service.logfile_path();
            let mut dump = format!("==> {} <==\n", bestrelpath(&logfile));
            if let Some(lines) = tail_lines(&logfile, FAILURE_TAIL_LINES) {
                for line in lines {
                    dump.push_str(&line);
                    dump.push('\n');
                }
            }
            write_stderr(&dump);
        }

        if change == StateChange::Start {
            // services that failed to start must not linger half-up
            let cleanup = self.subset(&failed);
            let stopping: Pin<Box<dyn Future<Output = Result<(), EngineError>> + '_>> =
                Box::pin(cleanup.stop(false));
            stopping.await?;
        }

        pgctl_print("");
        pgctl_print("There might be useful information further up in the log; you can view it by running:");
        for service in &failed_services {
            pgctl_print(&format!("    less +G {}", bestrelpath(&service.logfile_path())));
        }

        Err(UserError::Failures { action: change.verb(), failed: commafy(&failed) }.into())
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    async fn playground_is_down(&self) -> Result<bool, EngineError> {
        for service in &self.all_services {
            if svstat(service.path()).await?.user_state() != "down" {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// A twin engine scoped to a subset of services (no log viewer).
    fn subset(&self, names: &[String]) -> StateChangeEngine<C> {
        StateChangeEngine {
            playground: self.playground.clone(),
            services: self
                .services
                .iter()
                .filter(|service| names.iter().any(|name| name == service.name()))
                .cloned()
                .collect(),
            all_services: self.all_services.clone(),
            options: EngineOptions { log_viewer: false, ..self.options.clone() },
            clock: self.clock.clone(),
        }
    }
}

fn service_names(services: &[Service]) -> Vec<String> {
    services.iter().map(|service| service.name().to_string()).collect()
}

fn write_stderr(content: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = stderr.write_all(content.as_bytes());
    let _ = stderr.flush();
}

/// True when an interactive log panel makes sense: stderr is a tty and we
/// are not in CI — or the override variable insists.
pub fn log_viewer_enabled(stderr_is_tty: bool, env: impl Fn(&str) -> Option<String>) -> bool {
    if env("PGCTL_FORCE_ENABLE_LOG_VIEWER").is_some_and(|v| !v.is_empty()) {
        return true;
    }
    if env("CI").is_some() {
        return false;
    }
    stderr_is_tty
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
