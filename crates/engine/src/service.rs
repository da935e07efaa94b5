// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One supervised unit and its directory layout.
//!
//! A service is a playground subdirectory with an executable `run` plus
//! optional metadata files. Supervisor runtime state (FIFOs, locks) lives in
//! a scratch directory outside the service tree so it never leaks into
//! source control; `<service>/supervise` is a symlink into scratch that is
//! reconciled on every access, tolerating a user moving the repository.

use std::io::Write;
use std::os::unix::fs::{symlink, OpenOptionsExt, PermissionsExt};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use pgctl_core::UserError;
use pgctl_supervise::{
    fuser, ps::ps_table, sv_control, svok, svstat, Flock, FlockError, ProcessPhase, SvState,
    SvStatus, SvVerb,
};
use tracing::{debug, warn};

use crate::errors::EngineError;

/// Descriptor number the supervisor dedicates to readiness notification;
/// materialized into `notification-fd` when a `ready` script exists.
const NOTIFICATION_FD: &str = "4";

/// Mode bits for the logger's generated run script.
const SCRIPT_MODE: u32 = 0o755;

#[derive(Debug, Clone)]
pub struct Service {
    path: PathBuf,
    scratch_dir: PathBuf,
    name: String,
    default_timeout: f64,
}

impl Service {
    pub fn new(path: PathBuf, scratch_dir: PathBuf, default_timeout: f64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Service { path, scratch_dir, name, default_timeout }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn logfile_path(&self) -> PathBuf {
        self.path.join("logs").join("current")
    }

    /// The lock a pgctl invocation holds while managing this service.
    pub fn lock_path(&self) -> PathBuf {
        self.path.join(".pgctl.lock")
    }

    /// The lock the supervisor process tree holds for its lifetime.
    pub fn scratch_lock_path(&self) -> PathBuf {
        self.scratch_dir.join("lock")
    }

    fn log_service_dir(&self) -> PathBuf {
        self.path.join("log")
    }

    fn logpipe_path(&self) -> PathBuf {
        self.scratch_dir.join("logpipe")
    }

    // -----------------------------------------------------------------
    // Directory structure
    // -----------------------------------------------------------------

    /// Fail early when the service directory is missing; otherwise bring the
    /// supervise symlinks back in line with scratch.
    pub fn ensure_exists(&self) -> Result<(), EngineError> {
        if !self.path.is_dir() {
            return Err(UserError::NoSuchService { name: self.name.clone() }.into());
        }
        self.reconcile_supervise_links()?;
        Ok(())
    }

    pub fn ensure_logs(&self) -> Result<(), EngineError> {
        std::fs::create_dir_all(self.path.join("logs"))?;
        Ok(())
    }

    /// Materialize everything the supervisor needs before it starts: the
    /// scratch tree, the log FIFO, the logger's run script, the readiness
    /// notification file, and no stale `down` marker.
    pub fn ensure_directory_structure(&self) -> Result<(), EngineError> {
        self.ensure_exists()?;
        self.ensure_logs()?;

        std::fs::create_dir_all(self.scratch_dir.join("supervise"))?;
        std::fs::create_dir_all(self.scratch_dir.join("log").join("supervise"))?;

        let logpipe = self.logpipe_path();
        if !logpipe.exists() {
            nix::unistd::mkfifo(&logpipe, nix::sys::stat::Mode::from_bits_truncate(0o600))
                .map_err(std::io::Error::from)?;
        }

        self.write_logger_run_script()?;
        self.reconcile_supervise_links()?;

        if self.path.join("ready").exists() {
            write_if_changed(&self.path.join("notification-fd"), NOTIFICATION_FD)?;
        }

        // a stale down marker would keep the service from starting
        match std::fs::remove_file(self.path.join("down")) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    fn reconcile_supervise_links(&self) -> Result<(), EngineError> {
        ensure_symlink(&self.scratch_dir.join("supervise"), &self.path.join("supervise"))?;
        if self.log_service_dir().is_dir() {
            ensure_symlink(
                &self.scratch_dir.join("log").join("supervise"),
                &self.log_service_dir().join("supervise"),
            )?;
        }
        Ok(())
    }

    fn write_logger_run_script(&self) -> Result<(), EngineError> {
        std::fs::create_dir_all(self.log_service_dir())?;
        let script = self.log_service_dir().join("run");
        let content = "#!/bin/sh\nexec pgctl-timestamp \"$PGCTL_SCRATCH/logpipe\" \"$PGCTL_SERVICE/logs/current\"\n";
        if write_if_changed(&script, content)? {
            let mut permissions = std::fs::metadata(&script)?.permissions();
            permissions.set_mode(SCRIPT_MODE);
            std::fs::set_permissions(&script, permissions)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Probes
    // -----------------------------------------------------------------

    /// Is a supervisor alive for this service?
    pub async fn supervised(&self) -> Result<bool, EngineError> {
        self.reconcile_supervise_links()?;
        Ok(svok(&self.path).await?)
    }

    /// Status with readiness synthesis: a service with no `ready` script is
    /// ready whenever it is cleanly up, or momentarily down at second zero
    /// with exit 0 while the supervisor restarts it ("normally up, momentary
    /// blip" is not a failure).
    pub async fn status(&self) -> Result<SvStatus, EngineError> {
        let mut status = svstat(&self.path).await?;
        if !self.path.join("ready").exists() {
            let cleanly_up = status.state == SvState::Up && status.process.is_none();
            let momentary_blip = status.state == SvState::Down
                && status.seconds == Some(0)
                && status.exitcode == Some(0)
                && status.process == Some(ProcessPhase::Starting);
            if cleanly_up || momentary_blip {
                status.state = SvState::Ready;
                status.process = None;
            }
        }
        Ok(status)
    }

    // -----------------------------------------------------------------
    // State changes
    // -----------------------------------------------------------------

    /// Ensure a supervisor is running, then ask it to bring the service up.
    pub async fn start(&self) -> Result<(), EngineError> {
        self.ensure_directory_structure()?;
        if !self.supervised().await? {
            match self.background().await {
                Ok(()) => {}
                // a supervisor spawned on a previous tick owns the lock but
                // has not published its status yet; the assertion cycle
                // catches up with it
                Err(EngineError::User(UserError::LockHeld { .. })) => {}
                Err(err) => return Err(err),
            }
        }
        sv_control(SvVerb::Up, &self.path).await?;
        Ok(())
    }

    /// Bring the service down and make its supervisor exit.
    pub async fn stop(&self) -> Result<(), EngineError> {
        self.ensure_exists()?;
        self.signal_down_events();
        sv_control(SvVerb::DownAndUnsupervise, &self.path).await?;
        Ok(())
    }

    /// Stop the logger sidecar specifically.
    pub async fn stop_logs(&self) -> Result<(), EngineError> {
        sv_control(SvVerb::DownAndUnsupervise, &self.log_service_dir()).await?;
        Ok(())
    }

    pub async fn assert_ready(&self) -> Result<(), EngineError> {
        let status = self.status().await?;
        if status.state != SvState::Ready {
            return Err(EngineError::not_ready("ready", status));
        }
        Ok(())
    }

    /// Stopped means: no supervisor, and nothing still holding the
    /// supervisor-lifetime lock. With `with_log_running` the logger sidecar
    /// is allowed to stay up (restart keeps it alive across the stop).
    pub async fn assert_stopped(&self, with_log_running: bool) -> Result<(), EngineError> {
        let status = svstat(&self.path).await?;
        if status.state != SvState::Unsupervised {
            return Err(EngineError::not_ready("stopped", status));
        }

        match Flock::try_acquire(&self.scratch_lock_path()) {
            Ok(lock) => drop(lock),
            // never brought up: no scratch dir, no lock, nothing to hold it
            Err(FlockError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(FlockError::Contended { path }) => {
                let table = ps_table(&fuser(&path, true));
                if !table.is_empty() {
                    return Err(EngineError::User(UserError::LockHeld {
                        message: format!(
                            "these runaway processes did not stop:\n{table}\
                             There are two ways you can fix this:\n  \
                             * temporarily: lsof -t {0} | xargs kill -9\n  \
                             * permanently: http://pgctl.readthedocs.org/en/latest/user/quickstart.html#writing-playground-services\n",
                            crate::output::bestrelpath(&path),
                        ),
                    }));
                }
                // every holder exited between the probe and the ps: treat as
                // released
            }
            Err(err) => return Err(err.into()),
        }

        if !with_log_running && self.log_service_dir().is_dir() {
            let log_status = svstat(&self.log_service_dir()).await?;
            if log_status.state != SvState::Unsupervised {
                return Err(EngineError::not_ready("stopped", format!("logger: {log_status}")));
            }
        }
        Ok(())
    }

    /// SIGKILL everything still holding the supervisor-lifetime lock after
    /// the graceful window elapsed. Returns the warning to show the user.
    pub fn force_cleanup(&self) -> Result<String, EngineError> {
        let lock_path = self.scratch_lock_path();
        let pids = fuser(&lock_path, true);
        let table = ps_table(&pids);
        for pid in &pids {
            // ESRCH means it beat us to the exit
            let _ = kill(Pid::from_raw(*pid), Signal::SIGKILL);
        }
        debug!("force_cleanup {}: killed {:?}", self.name, pids);
        Ok(format!(
            "WARNING: Killing these runaway processes, which did not stop:\n{table}\
             This usually means these processes do not handle SIGTERM; see\n    \
             http://pgctl.readthedocs.org/en/latest/user/quickstart.html#writing-playground-services\n",
        ))
    }

    // -----------------------------------------------------------------
    // Supervisor lifecycle
    // -----------------------------------------------------------------

    /// Launch the supervisors (service + logger) detached in the background.
    ///
    /// The scratch lock descriptor is made inheritable and stays open across
    /// the service supervisor's spawn, so the lock lives exactly as long as
    /// the supervisor's process tree. The logger's supervisor must NOT
    /// inherit it — a restart leaves the logger running while the lock has
    /// to come free.
    pub async fn background(&self) -> Result<(), EngineError> {
        self.ensure_directory_structure()?;

        let lock = match Flock::try_acquire(&self.scratch_lock_path()) {
            Ok(lock) => lock,
            Err(FlockError::Contended { path }) => {
                return Err(EngineError::User(UserError::LockHeld {
                    message: format!(
                        "a supervisor already holds the lock for this service: ({})\n{}",
                        crate::output::bestrelpath(&path),
                        ps_table(&fuser(&path, false)),
                    ),
                }))
            }
            Err(err) => return Err(err.into()),
        };

        // Logger first, with the lock descriptor close-on-exec.
        lock.set_inheritable(false)?;
        self.spawn_supervisor(&self.log_service_dir(), &lock)?;

        lock.set_inheritable(true)?;
        self.spawn_supervisor(&self.path, &lock)?;

        // Our copy closes here; the supervisor's inherited copy keeps the
        // lock held.
        lock.release();
        Ok(())
    }

    fn spawn_supervisor(&self, dir: &Path, lock: &Flock) -> Result<(), EngineError> {
        let logpipe = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.logpipe_path())?;
        let stderr_pipe = logpipe.try_clone()?;

        let mut command = std::process::Command::new("s6-supervise");
        command
            .arg(dir)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::from(logpipe))
            .stderr(std::process::Stdio::from(stderr_pipe))
            .process_group(0)
            .env("PGCTL_SCRATCH", &self.scratch_dir)
            .env("PGCTL_SERVICE", &self.path)
            .env("PGCTL_SERVICE_LOCK", lock.raw_fd().to_string());
        let child = command.spawn()?;
        debug!("spawned s6-supervise {} (pid {})", dir.display(), child.id());
        Ok(())
    }

    /// Exec the service's run script in the current process, for `pgctl
    /// debug`. Only returns on failure; Ctrl-C goes straight to the service.
    pub fn foreground(&self) -> EngineError {
        if let Err(err) = self.ensure_directory_structure() {
            return err;
        }
        let err = std::process::Command::new(self.path.join("run"))
            .current_dir(&self.path)
            .env("PGCTL_DEBUG", "true")
            .env("PGCTL_SCRATCH", &self.scratch_dir)
            .env("PGCTL_SERVICE", &self.path)
            .exec();
        EngineError::Io(err)
    }

    /// Let the readiness daemon observe teardown: write the down token into
    /// every down-event FIFO in scratch. Absent readers are fine.
    fn signal_down_events(&self) {
        let entries = match std::fs::read_dir(&self.scratch_dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            if !entry.file_name().to_string_lossy().starts_with("down-event-") {
                continue;
            }
            let opened = std::fs::OpenOptions::new()
                .write(true)
                .custom_flags(nix::libc::O_NONBLOCK)
                .open(entry.path());
            match opened {
                Ok(mut fifo) => {
                    let _ = fifo.write_all(b"d");
                }
                // ENXIO: no reader on the other end (daemon already gone)
                Err(err) => debug!("down-event signal skipped: {err}"),
            }
        }
    }

    // -----------------------------------------------------------------
    // Per-service tunables and hooks
    // -----------------------------------------------------------------

    pub fn timeout_ready(&self) -> Duration {
        self.timeout_from_file("timeout-ready")
    }

    pub fn timeout_stop(&self) -> Duration {
        self.timeout_from_file("timeout-stop")
    }

    fn timeout_from_file(&self, filename: &str) -> Duration {
        let path = self.path.join(filename);
        let seconds = match std::fs::read_to_string(&path) {
            Ok(text) => match text.trim().parse::<f64>() {
                Ok(seconds) => seconds,
                Err(_) => {
                    warn!("ignoring unparseable {}: {:?}", filename, text.trim());
                    self.default_timeout
                }
            },
            Err(_) => self.default_timeout,
        };
        Duration::from_secs_f64(seconds.max(0.0))
    }

    /// Run `<verb>-msg` if the service provides it; its stdout is surfaced
    /// to the user as program data.
    pub fn message(&self, verb: &str) -> Result<Option<String>, EngineError> {
        let script = self.path.join(format!("{verb}-msg"));
        if !script.exists() {
            return Ok(None);
        }
        let output = std::process::Command::new(&script).current_dir(&self.path).output()?;
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

/// Forcefully point `link` at `target`, but only when it isn't already.
fn ensure_symlink(target: &Path, link: &Path) -> Result<(), std::io::Error> {
    // only services that have been brought up get a supervise symlink
    if !target.exists() {
        return Ok(());
    }
    if std::fs::read_link(link).is_ok_and(|current| current == target) {
        return Ok(());
    }
    match std::fs::remove_file(link) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    symlink(target, link)
}

/// Write `content` unless the file already holds it; reports whether a
/// write happened.
fn write_if_changed(path: &Path, content: &str) -> Result<bool, std::io::Error> {
    if std::fs::read_to_string(path).is_ok_and(|current| current == content) {
        return Ok(false);
    }
    std::fs::write(path, content)?;
    Ok(true)
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
