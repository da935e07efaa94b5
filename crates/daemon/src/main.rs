// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pgctl-poll-ready` — bridge a `./ready` script to the supervisor's
//! readiness notification.
//!
//! Usage (in a service's run script): `pgctl-poll-ready my-server --flag …`
//!
//! The wrapper creates the down-event FIFO, spawns the readiness daemon as a
//! child, then execs the wrapped command — leaving the daemon a child of the
//! service process itself. In debug mode the daemon is skipped entirely.

use std::io::{Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pgctl_daemon::poll_ready::{poll_ready_loop, LoopOutcome, Tunables};

const CHANNEL: &str = "pgctl-poll-ready:";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            eprintln!("usage: pgctl-poll-ready COMMAND [ARGS…]");
            ExitCode::from(2)
        }
        [flag, fifo, fd] if flag == "--daemon" => match fd.parse::<i32>() {
            Ok(fd) => daemon_main(PathBuf::from(fifo), fd),
            Err(_) => {
                eprintln!("{CHANNEL} bad notification descriptor: {fd}");
                ExitCode::FAILURE
            }
        },
        command => wrapper_main(command),
    }
}

// ---------------------------------------------------------------------------
// Wrapper: runs in the service's own process, then becomes the service
// ---------------------------------------------------------------------------

fn wrapper_main(command: &[String]) -> ExitCode {
    // Debug mode: no daemon, just become the wrapped command.
    if std::env::var("PGCTL_DEBUG").is_ok_and(|value| !value.is_empty()) {
        return exec_command(command);
    }

    let notification_fd = match read_notification_fd() {
        Ok(fd) => fd,
        Err(err) => {
            eprintln!("{CHANNEL} {err}");
            return ExitCode::FAILURE;
        }
    };

    // The FIFO is created before the daemon exists, so a run command that
    // exits instantly still leaves a teardown channel the daemon can watch.
    // The name carries our pid: restarts must not collide.
    let scratch = std::env::var("PGCTL_SCRATCH").unwrap_or_else(|_| ".".to_string());
    let fifo = Path::new(&scratch).join(format!("down-event-{}", std::process::id()));
    if let Err(err) = make_fifo(&fifo) {
        eprintln!("{CHANNEL} could not create down-event pipe: {err}");
        return ExitCode::FAILURE;
    }

    let daemon = std::env::current_exe().map(|exe| {
        std::process::Command::new(exe)
            .arg("--daemon")
            .arg(&fifo)
            .arg(notification_fd.to_string())
            .spawn()
    });
    match daemon {
        Ok(Ok(_child)) => {}
        Ok(Err(err)) | Err(err) => {
            // the daemon is best-effort; the service still runs
            eprintln!("{CHANNEL} could not spawn the readiness daemon: {err}");
        }
    }

    exec_command(command)
}

fn read_notification_fd() -> Result<i32, String> {
    let text = std::fs::read_to_string("notification-fd")
        .map_err(|err| format!("notification-fd is unreadable: {err}"))?;
    text.trim()
        .parse::<f64>()
        .map(|fd| fd as i32)
        .map_err(|_| format!("notification-fd does not name a descriptor: {:?}", text.trim()))
}

fn make_fifo(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    nix::unistd::mkfifo(path, nix::sys::stat::Mode::from_bits_truncate(0o600))
        .map_err(std::io::Error::from)
}

fn exec_command(command: &[String]) -> ExitCode {
    let Some((program, args)) = command.split_first() else {
        return ExitCode::from(2);
    };
    let err = std::process::Command::new(program).args(args).exec();
    eprintln!("{CHANNEL} could not exec {program}: {err}");
    ExitCode::from(127)
}

// ---------------------------------------------------------------------------
// Daemon: child of the service process, polls ./ready in the service dir
// ---------------------------------------------------------------------------

fn daemon_main(fifo: PathBuf, notification_fd: i32) -> ExitCode {
    let mut down_reader = match std::fs::OpenOptions::new()
        .read(true)
        .custom_flags(nix::libc::O_NONBLOCK)
        .open(&fifo)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("{CHANNEL} could not open the down-event pipe: {err}");
            return ExitCode::FAILURE;
        }
    };

    let tunables = Tunables::discover(Path::new("."), |name| std::env::var(name).ok());

    let outcome = poll_ready_loop(
        || {
            let mut buffer = [0u8; 16];
            match down_reader.read(&mut buffer) {
                Ok(read) => buffer[..read].contains(&b'd'),
                Err(_) => false,
            }
        },
        || {
            std::process::Command::new("./ready")
                .status()
                .map(|status| status.success())
                .unwrap_or(false)
        },
        || {
            // A fresh open file description onto the inherited pipe; writing
            // to a raw descriptor without reopening would need unsafe fd
            // adoption.
            let mut pipe = std::fs::OpenOptions::new()
                .write(true)
                .open(format!("/proc/self/fd/{notification_fd}"))?;
            pipe.write_all(b"ready\n")
        },
        tunables,
        |seconds| std::thread::sleep(std::time::Duration::from_secs_f64(seconds.max(0.0))),
        |line| eprintln!("{CHANNEL} {line}"),
    );

    let _ = std::fs::remove_file(&fifo);
    match outcome {
        LoopOutcome::DownDuringStartup | LoopOutcome::DownDuringHeartbeat => ExitCode::SUCCESS,
        LoopOutcome::StartupTimedOut => ExitCode::FAILURE,
        LoopOutcome::RestartNeeded => restart_service(),
    }
}

/// Hand the ailing service to `pgctl restart`. We chdir out of the service
/// directory first so the restart's stop phase does not see us holding it.
fn restart_service() -> ExitCode {
    let service_dir = std::env::var("PGCTL_SERVICE")
        .map(PathBuf::from)
        .or_else(|_| std::env::current_dir())
        .unwrap_or_else(|_| PathBuf::from("."));
    let name = service_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string());
    let parent = service_dir.parent().unwrap_or(Path::new("."));

    if let Err(err) = std::env::set_current_dir(parent) {
        eprintln!("{CHANNEL} could not leave the service directory: {err}");
        return ExitCode::FAILURE;
    }
    let err = std::process::Command::new("pgctl").arg("restart").arg(&name).exec();
    eprintln!("{CHANNEL} could not exec pgctl restart: {err}");
    ExitCode::FAILURE
}
