//! End-to-end tests for the scene-browser binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A data root with a few maps and a settings file searching `maps/`
fn create_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("data/maps/city")).unwrap();
    fs::write(root.join("data/maps/Tavern_Night.webp"), b"webp").unwrap();
    fs::write(root.join("data/maps/Forest.png"), b"png").unwrap();
    fs::write(root.join("data/maps/city/Tavern_Day.png"), b"png").unwrap();

    fs::write(
        root.join("settings.json"),
        r#"{"settings": {"search_paths": ["maps/"]}}"#,
    )
    .unwrap();

    temp_dir
}

fn scene_browser(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scene-browser").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .current_dir(workspace)
        .arg("--config")
        .arg(workspace.join("settings.json"))
        .arg("--data-root")
        .arg(workspace.join("data"));
    cmd
}

#[test]
fn test_search_prints_matches() {
    let workspace = create_workspace();

    scene_browser(workspace.path())
        .args(["search", "tavern"])
        .assert()
        .success()
        .stdout(predicate::str::contains("maps/Tavern_Night.webp"))
        .stdout(predicate::str::contains("maps/city/Tavern_Day.png"))
        .stdout(predicate::str::contains("Forest").not());
}

#[test]
fn test_search_json() {
    let workspace = create_workspace();

    let output = scene_browser(workspace.path())
        .args(["search", "--json", "--no-cache", "forest"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["query"], "forest");
    assert_eq!(json["groups"][0]["assets"][0]["path"], "maps/Forest.png");
    assert_eq!(json["groups"][0]["assets"][0]["is_image"], true);
}

#[test]
fn test_scan_streams_everything() {
    let workspace = create_workspace();

    scene_browser(workspace.path())
        .arg("scan")
        .assert()
        .success()
        .stdout(predicate::str::contains("maps/Forest.png"))
        .stdout(predicate::str::contains("maps/city/Tavern_Day.png"))
        .stderr(predicate::str::contains("3 assets found"));
}

#[test]
fn test_cache_stats() {
    let workspace = create_workspace();

    scene_browser(workspace.path())
        .arg("cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Assets:   3"))
        .stdout(predicate::str::contains("populated"));
}

#[test]
fn test_paths_add_is_persisted() {
    let workspace = create_workspace();

    scene_browser(workspace.path())
        .args(["paths", "add", "s3:mybucket:maps/city"])
        .assert()
        .success();

    let saved = fs::read_to_string(workspace.path().join("settings.json")).unwrap();
    assert!(saved.contains("s3:mybucket:maps/city"));

    scene_browser(workspace.path())
        .args(["paths", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3 bucket 'mybucket' at 'maps/city'"));
}

#[test]
fn test_read_only_session_rejects_changes() {
    let workspace = create_workspace();

    scene_browser(workspace.path())
        .args(["--read-only", "paths", "add", "more/maps/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be modified"));
}

#[test]
fn test_settings_set_and_show() {
    let workspace = create_workspace();

    scene_browser(workspace.path())
        .args(["settings", "set", "excluded_keywords", "and,for,the"])
        .assert()
        .success();

    scene_browser(workspace.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"excluded_keywords\": \"and,for,the\""));

    scene_browser(workspace.path())
        .args(["settings", "set", "keyword_search", "maybe"])
        .assert()
        .failure();
}
