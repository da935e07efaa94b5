// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn creates_the_lock_file_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".pgctl.lock");
    assert!(!path.exists());
    let lock = Flock::try_acquire(&path).unwrap();
    assert!(path.exists());
    drop(lock);
}

#[test]
fn grants_the_lock_to_exactly_one_holder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".pgctl.lock");

    let first = Flock::try_acquire(&path).unwrap();
    let second = Flock::try_acquire(&path);
    assert!(matches!(second, Err(FlockError::Contended { .. })));

    // Released on drop; a later acquire succeeds.
    drop(first);
    Flock::try_acquire(&path).unwrap();
}

#[test]
fn locks_a_directory_target() {
    let dir = tempfile::tempdir().unwrap();
    let lock = Flock::try_acquire(dir.path()).unwrap();
    assert!(matches!(
        Flock::try_acquire(dir.path()),
        Err(FlockError::Contended { .. })
    ));
    drop(lock);
}

#[test]
fn on_fail_retry_loops_until_released() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lock");
    let held = Flock::try_acquire(&path).unwrap();

    let mut attempts = 0;
    let result = Flock::acquire(&path, |p| {
        assert_eq!(p, path.as_path());
        attempts += 1;
        if attempts >= 3 {
            Err(FlockError::Held { message: "gave up".to_string() })
        } else {
            Ok(OnContention::Retry)
        }
    });
    assert!(matches!(result, Err(FlockError::Held { .. })));
    assert_eq!(attempts, 3);
    drop(held);
}

#[test]
fn on_fail_is_not_consulted_when_uncontended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lock");
    let lock = Flock::acquire(&path, |_| {
        panic!("uncontended acquire must not call on_fail");
    })
    .unwrap();
    drop(lock);
}

#[test]
fn inheritability_toggles_cloexec() {
    let dir = tempfile::tempdir().unwrap();
    let lock = Flock::try_acquire(&dir.path().join("lock")).unwrap();

    lock.set_inheritable(false).unwrap();
    let bits = fcntl(lock.raw_fd(), FcntlArg::F_GETFD).unwrap();
    assert!(FdFlag::from_bits_truncate(bits).contains(FdFlag::FD_CLOEXEC));

    lock.set_inheritable(true).unwrap();
    let bits = fcntl(lock.raw_fd(), FcntlArg::F_GETFD).unwrap();
    assert!(!FdFlag::from_bits_truncate(bits).contains(FdFlag::FD_CLOEXEC));
}
