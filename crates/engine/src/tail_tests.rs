// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use std::time::Duration;

async fn eventually(tailer: &mut LogTailer) -> bool {
    for _ in 0..100 {
        if tailer.new_lines_available() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn observes_appended_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("current");
    std::fs::write(&log, "").unwrap();

    let mut tailer = LogTailer::new(vec![log.clone()]).unwrap();

    let mut file = std::fs::OpenOptions::new().append(true).open(&log).unwrap();
    writeln!(file, "hello from the service").unwrap();
    file.flush().unwrap();

    assert!(eventually(&mut tailer).await, "no lines observed");
    let events = tailer.get_logs();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].path, log);
    assert!(events[0].lines.iter().any(|l| l.contains("hello from the service")));

    tailer.cleanup();
}

#[tokio::test]
async fn no_lines_without_writes() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("quiet");
    std::fs::write(&log, "").unwrap();

    let mut tailer = LogTailer::new(vec![log]).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!tailer.new_lines_available());
    assert!(tailer.get_logs().is_empty());
    tailer.cleanup();
}

#[tokio::test]
async fn stop_tailing_removes_one_path() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    std::fs::write(&a, "").unwrap();
    std::fs::write(&b, "").unwrap();

    let mut tailer = LogTailer::new(vec![a.clone(), b.clone()]).unwrap();
    tailer.stop_tailing(&a);

    let mut file = std::fs::OpenOptions::new().append(true).open(&b).unwrap();
    writeln!(file, "b only").unwrap();
    drop(file);

    assert!(eventually(&mut tailer).await);
    let events = tailer.get_logs();
    assert!(events.iter().all(|event| event.path == b));
    tailer.cleanup();
}
