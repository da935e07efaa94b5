//! Configuration layering specs

use crate::prelude::*;

#[test]
fn config_dumps_merged_json() {
    let playground = Playground::new();
    let output = playground.pgctl().args(&["config"]).passes();

    let parsed: serde_json::Value = serde_json::from_str(&output.stdout).expect("valid JSON");
    assert_eq!(parsed["pgdir"], "playground");
    assert_eq!(parsed["timeout"], 2.0);
    assert_eq!(parsed["services"][0], "default");
    assert_eq!(parsed["aliases"]["default"][0], "(all services)");
}

#[test]
fn config_file_feeds_the_merge() {
    let playground = Playground::new();
    playground.file(".pgctl.toml", "timeout = 9.5\npgdir = \"playground\"\n");

    let output = playground.pgctl().args(&["config"]).passes();
    let parsed: serde_json::Value = serde_json::from_str(&output.stdout).expect("valid JSON");
    assert_eq!(parsed["timeout"], 9.5);
}

#[test]
fn environment_beats_the_config_file() {
    let playground = Playground::new();
    playground.file(".pgctl.toml", "timeout = 9.5\n");

    let output =
        playground.pgctl().env("PGCTL_TIMEOUT", "3.25").args(&["config"]).passes();
    let parsed: serde_json::Value = serde_json::from_str(&output.stdout).expect("valid JSON");
    assert_eq!(parsed["timeout"], 3.25);
}

#[test]
fn cli_flags_beat_everything() {
    let playground = Playground::new();
    playground.file(".pgctl.toml", "pgdir = \"elsewhere\"\n");

    let output = playground
        .pgctl()
        .env("PGCTL_PGDIR", "also-elsewhere")
        .args(&["--pgdir", "winner", "config"])
        .passes();
    let parsed: serde_json::Value = serde_json::from_str(&output.stdout).expect("valid JSON");
    assert_eq!(parsed["pgdir"], "winner");
}

#[test]
fn malformed_config_file_is_a_user_error() {
    let playground = Playground::new();
    playground.file(".pgctl.toml", "pgdir = [this is not toml\n");
    playground.pgctl().args(&["config"]).fails().stderr_has("[pgctl] ERROR: bad config file");
}
