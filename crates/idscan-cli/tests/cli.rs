use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn idscan() -> Command {
    Command::cargo_bin("idscan").unwrap()
}

/// Write a default config whose OCR models point at a directory that does not exist.
fn config_without_models(dir: &Path) -> String {
    let config_path = dir.join("config.json");
    idscan()
        .args(["--config", config_path.to_str().unwrap(), "config", "init"])
        .assert()
        .success();
    idscan()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "config",
            "set",
            "ocr.model_dir",
            dir.join("no-models").to_str().unwrap(),
        ])
        .assert()
        .success();
    config_path.display().to_string()
}

#[test]
fn help_lists_subcommands() {
    idscan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn config_init_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("nested").join("config.json");
    let config_arg = config_path.to_str().unwrap();

    idscan()
        .args(["--config", config_arg, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(config_path.exists());

    idscan()
        .args(["--config", config_arg, "config", "get", "model.max_tokens"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1000"));

    idscan()
        .args(["--config", config_arg, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_set_updates_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let config_arg = config_path.to_str().unwrap();

    idscan()
        .args(["--config", config_arg, "config", "set", "batch.jobs", "3"])
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(saved["batch"]["jobs"], 3);

    idscan()
        .args(["--config", config_arg, "config", "set", "batch.nope", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn batch_on_empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_without_models(dir.path());
    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("readme.txt"), "not an image").unwrap();

    idscan()
        .args(["--config", &config, "batch", docs.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn batch_without_models_fails_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_without_models(dir.path());
    let docs = dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("01.jpg"), b"\xff\xd8\xff").unwrap();

    idscan()
        .args(["--config", &config, "batch", docs.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("model file not found"));
}

#[test]
fn process_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_without_models(dir.path());

    idscan()
        .args([
            "--config",
            &config,
            "process",
            dir.path().join("missing.jpg").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}
