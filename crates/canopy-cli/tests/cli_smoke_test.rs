use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("tree").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn run_json(args: &[&str]) -> Value {
    let exe = assert_cmd::cargo_bin!("canopy-cli");
    let output = Command::new(exe)
        .current_dir(repo_root())
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

#[test]
fn cli_lays_out_fixture() {
    let input = fixture("basic.json");
    let out = run_json(&["layout", input.to_string_lossy().as_ref()]);

    let nodes = out["nodes"].as_array().expect("nodes");
    assert!(!nodes.is_empty());
    assert_eq!(out["width"], 1000.0);
    assert_eq!(out["truncated"], 0);
    assert!(nodes.iter().any(|n| n["path"] == "src/layout"));
    assert!(nodes.iter().any(|n| n["path"] == "docs/guide/intro.md"));
    assert!(nodes.iter().all(|n| !n["path"].as_str().unwrap_or("<").starts_with('<')));
    assert!(out.get("cache").is_none());
}

#[test]
fn cli_reads_stdin_and_applies_flags() {
    let input = fs::read_to_string(fixture("basic.json")).expect("read fixture");
    let exe = assert_cmd::cargo_bin!("canopy-cli");
    let output = assert_cmd::Command::new(exe)
        .args(["layout", "--max-depth", "1", "--max-nodes", "2", "-"])
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out: Value = serde_json::from_slice(&output).expect("stdout is JSON");

    let nodes = out["nodes"].as_array().expect("nodes");
    assert_eq!(nodes.len(), 2);
    assert!(nodes.iter().all(|n| n["depth"] == 1));
    assert_eq!(out["truncated"], 1);
}

#[test]
fn cli_config_file_sets_options() {
    let input = fixture("basic.json");
    let config = fixture("options.json");
    let out = run_json(&[
        "layout",
        "--config",
        config.to_string_lossy().as_ref(),
        input.to_string_lossy().as_ref(),
    ]);

    assert_eq!(out["width"], 800.0);
    assert_eq!(out["height"], 600.0);
    assert_eq!(out["highlightedPaths"][0], "src/layout");
}

#[test]
fn cli_cache_round_trips_between_runs() {
    let input = fixture("basic.json");
    let tmp = tempfile::tempdir().expect("tempdir");
    let cache = tmp.path().join("cache.json");
    let out_path = tmp.path().join("layout.json");
    let cache_arg = cache.to_string_lossy().to_string();

    // First run: cache file does not exist yet.
    let first = run_json(&[
        "layout",
        "--cache",
        &cache_arg,
        "--cache-out",
        &cache_arg,
        input.to_string_lossy().as_ref(),
    ]);
    let saved = fs::read_to_string(&cache).expect("cache written");
    let saved: Value = serde_json::from_str(&saved).expect("cache JSON");
    assert!(saved["positions"]["src"].is_array());
    assert!(saved["sortOrders"]["src"].is_number());

    let exe = assert_cmd::cargo_bin!("canopy-cli");
    Command::new(exe)
        .args([
            "layout",
            "--pretty",
            "--cache",
            &cache_arg,
            "--out",
            out_path.to_string_lossy().as_ref(),
            input.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    let second: Value =
        serde_json::from_str(&fs::read_to_string(&out_path).expect("out written")).expect("JSON");

    assert_eq!(first["nodes"].as_array().map(Vec::len), second["nodes"].as_array().map(Vec::len));
    for (a, b) in first["nodes"]
        .as_array()
        .into_iter()
        .flatten()
        .zip(second["nodes"].as_array().into_iter().flatten())
    {
        assert_eq!(a["path"], b["path"]);
        let dx = a["x"].as_f64().unwrap_or(0.0) - b["x"].as_f64().unwrap_or(0.0);
        let dy = a["y"].as_f64().unwrap_or(0.0) - b["y"].as_f64().unwrap_or(0.0);
        assert!(dx.hypot(dy) < 40.0, "{} moved", a["path"]);
    }
}

#[test]
fn cli_rejects_bad_options() {
    let input = fixture("basic.json");
    let exe = assert_cmd::cargo_bin!("canopy-cli");
    let assert = Command::new(exe)
        .args(["layout", "--max-depth", "0", input.to_string_lossy().as_ref()])
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("maxDepth"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_unknown_color_encoding() {
    let input = fixture("basic.json");
    let exe = assert_cmd::cargo_bin!("canopy-cli");
    Command::new(exe)
        .args([
            "layout",
            "--color-encoding",
            "rainbow",
            input.to_string_lossy().as_ref(),
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn cli_reports_missing_input() {
    let exe = assert_cmd::cargo_bin!("canopy-cli");
    let assert = Command::new(exe)
        .args(["layout", "does/not/exist.json"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("does/not/exist.json"), "stderr: {stderr}");
}
