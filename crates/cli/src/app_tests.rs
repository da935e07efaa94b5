// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;
use serial_test::serial;

fn cli(args: &[&str]) -> (Cli, ServiceSelection) {
    let mut full = vec!["pgctl"];
    full.extend(args);
    let cli = Cli::try_parse_from(full).unwrap();
    let selection = match &cli.command {
        crate::Command::Start(s)
        | crate::Command::Stop(s)
        | crate::Command::Status(s)
        | crate::Command::Restart(s)
        | crate::Command::Reload(s)
        | crate::Command::Log(s)
        | crate::Command::Debug(s)
        | crate::Command::Config(s) => s.clone(),
    };
    (cli, selection)
}

fn app(args: &[&str]) -> PgctlApp {
    // tests are #[serial]; an inherited PGCTL_* would poison the layering
    for (name, _) in std::env::vars() {
        if name.starts_with("PGCTL_") {
            std::env::remove_var(&name);
        }
    }
    let (parsed, selection) = cli(args);
    PgctlApp::from_cli(&parsed, &selection).unwrap()
}

#[test]
#[serial]
fn defaults_without_flags() {
    let app = app(&["status"]);
    assert_eq!(app.config.pgdir, "playground");
    assert_eq!(app.config.services, vec!["default"]);
    assert!(!app.config.json);
}

#[test]
#[serial]
fn flags_override_defaults() {
    let app = app(&["--pgdir", "pg", "--json", "--no-force", "--verbose", "status", "web", "db"]);
    assert_eq!(app.config.pgdir, "pg");
    assert!(app.config.json);
    assert!(app.config.no_force);
    assert!(app.config.verbose);
    assert_eq!(app.config.services, vec!["web", "db"]);
}

#[test]
#[serial]
fn all_flag_selects_every_service() {
    let app = app(&["start", "--all"]);
    assert_eq!(app.config.services, vec![pgctl_core::ALL_SERVICES]);
}

#[test]
fn all_conflicts_with_names() {
    let result = Cli::try_parse_from(["pgctl", "start", "--all", "web"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn playground_is_found_in_a_parent_directory() {
    let root = tempfile::tempdir().unwrap();
    let playground = root.path().join("playground");
    let deep = root.path().join("src").join("deep");
    std::fs::create_dir_all(&playground).unwrap();
    std::fs::create_dir_all(&deep).unwrap();

    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(&deep).unwrap();
    let found = app(&["status"]).pgdir();
    std::env::set_current_dir(original).unwrap();

    assert_eq!(found.unwrap().canonicalize().unwrap(), playground.canonicalize().unwrap());
}

#[test]
#[serial]
fn missing_playground_is_a_user_error() {
    let root = tempfile::tempdir().unwrap();
    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(root.path()).unwrap();
    let err = app(&["status"]).pgdir().unwrap_err();
    std::env::set_current_dir(original).unwrap();

    assert!(err.user_level);
    assert_eq!(err.message, "could not find any directory named 'playground'");
}

#[test]
#[serial]
fn scratch_dir_mirrors_the_service_path_under_pghome() {
    let app = app(&["--pghome", "/tmp/pgctl-home", "status"]);
    let service = app.service_by_name("/projects/x/playground/web").unwrap();
    assert_eq!(service.path(), Path::new("/projects/x/playground/web"));
    assert_eq!(
        service.scratch_dir(),
        Path::new("/tmp/pgctl-home/projects/x/playground/web")
    );
}
