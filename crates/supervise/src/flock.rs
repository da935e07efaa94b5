// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory exclusive file locks.
//!
//! POSIX flocks release automatically when the holding process dies, so a
//! crashed pgctl can never deadlock later invocations. Acquisition is always
//! non-blocking; contention is a first-class outcome, not a wait.

use std::fs::File;
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlockError {
    /// Someone else holds the lock and the caller chose not to wait.
    #[error("lock is held: {}", path.display())]
    Contended { path: PathBuf },

    /// Contention, upgraded by an `on_fail` callback with diagnostics about
    /// the holder.
    #[error("{message}")]
    Held { message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What an `on_fail` callback wants done about contention.
pub enum OnContention {
    Retry,
}

/// An exclusive advisory lock on a file or directory.
///
/// The descriptor is made inheritable on acquisition (children spawned while
/// it is open keep the lock alive past our exit); callers that must not leak
/// the lock flip it back with [`Flock::set_inheritable`].
#[derive(Debug)]
pub struct Flock {
    file: File,
    path: PathBuf,
}

impl Flock {
    /// Acquire without waiting; `Contended` if someone else holds it.
    pub fn try_acquire(path: &Path) -> Result<Self, FlockError> {
        let file = open_lockable(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                return Err(FlockError::Contended { path: path.to_path_buf() });
            }
            Err(err) => return Err(FlockError::Io(err)),
        }
        let lock = Flock { file, path: path.to_path_buf() };
        lock.set_inheritable(true)?;
        Ok(lock)
    }

    /// Acquire, consulting `on_fail` on contention: `Retry` loops, an error
    /// propagates. The callback is the hook point for "who holds this?"
    /// diagnostics.
    pub fn acquire(
        path: &Path,
        mut on_fail: impl FnMut(&Path) -> Result<OnContention, FlockError>,
    ) -> Result<Self, FlockError> {
        loop {
            match Self::try_acquire(path) {
                Ok(lock) => return Ok(lock),
                Err(FlockError::Contended { path }) => match on_fail(&path)? {
                    OnContention::Retry => continue,
                },
                Err(err) => return Err(err),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw descriptor, for handing to children via the environment.
    pub fn raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Control whether the descriptor survives exec in spawned children.
    pub fn set_inheritable(&self, inheritable: bool) -> Result<(), io::Error> {
        set_inheritable(self.file.as_raw_fd(), inheritable)
    }

    /// Release explicitly (dropping does the same).
    pub fn release(self) {}
}

/// Set or clear FD_CLOEXEC on an arbitrary descriptor.
pub fn set_inheritable(fd: RawFd, inheritable: bool) -> Result<(), io::Error> {
    let bits = fcntl(fd, FcntlArg::F_GETFD).map_err(io::Error::from)?;
    let mut flags = FdFlag::from_bits_truncate(bits);
    flags.set(FdFlag::FD_CLOEXEC, !inheritable);
    fcntl(fd, FcntlArg::F_SETFD(flags)).map_err(io::Error::from)?;
    Ok(())
}

/// Open `path` for locking, creating a regular file when absent. Directories
/// are acceptable lock targets and are opened read-only.
fn open_lockable(path: &Path) -> Result<File, io::Error> {
    match File::options().write(true).create(true).truncate(false).open(path) {
        Ok(file) => Ok(file),
        // EISDIR: the target is a directory
        Err(err) if err.raw_os_error() == Some(21) => File::open(path),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "flock_tests.rs"]
mod tests;
