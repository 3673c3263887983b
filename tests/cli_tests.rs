use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

fn write_config(dir: &Path) -> (PathBuf, PathBuf) {
    let data = dir.join("learned_material.csv");
    let config = dir.join("config.json");
    let json = serde_json::json!({
        "start_date": "2025-01-01",
        "horizon": { "days": 30 },
        "storage": { "path": data, "format": "csv" }
    });
    fs::write(&config, serde_json::to_vec_pretty(&json).unwrap()).unwrap();
    (config, data)
}

#[allow(deprecated)]
fn run_cli(dir: &TempDir, script: &str) -> assert_cmd::assert::Assert {
    let (config, _) = write_config(dir.path());
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.arg(config).write_stdin(script.to_string()).assert()
}

#[test]
fn cli_submits_and_reviews_material() {
    let dir = tempdir().unwrap();
    run_cli(
        &dir,
        "today 2025-01-01\nsubmit Rust|Ownership|single/own.html\ntoday 2025-01-02\nreview\nquit\n",
    )
    .success()
    .stdout(str_contains("Material saved for 2025-01-01."))
    .stdout(str_contains("Subject  : Rust"))
    .stdout(str_contains("No material to review for 2025-01-02 (today)."));
}

#[test]
fn cli_reports_overwrite_on_same_day() {
    let dir = tempdir().unwrap();
    run_cli(
        &dir,
        "today 2025-01-03\nsubmit Rust|Ownership|a.html\nsubmit Go|Channels|b.html\nquit\n",
    )
    .success()
    .stdout(str_contains("Replaced earlier entry 'Rust: Ownership'."));
}

#[test]
fn cli_declined_reset_keeps_data() {
    let dir = tempdir().unwrap();
    let (_, data) = write_config(dir.path());
    run_cli(&dir, "today 2025-01-01\nsubmit Art|Color|a.html\nquit\n").success();
    let before = fs::read(&data).unwrap();

    run_cli(&dir, "reset\ny\nno\nquit\n")
        .success()
        .stdout(str_contains("contains 1 records of learned material"))
        .stdout(str_contains("The calendar has not been reset."));
    assert_eq!(fs::read(&data).unwrap(), before);
}

#[test]
fn cli_confirmed_reset_discards_data() {
    let dir = tempdir().unwrap();
    run_cli(&dir, "today 2025-01-01\nsubmit Art|Color|a.html\nquit\n").success();
    run_cli(&dir, "today 2025-01-01\nreset\ny\nyes\nsummary\nquit\n")
        .success()
        .stdout(str_contains("(1 records discarded)"))
        .stdout(str_contains("Days learned       : 0"));
}

#[test]
fn cli_runs_standard_queries() {
    let dir = tempdir().unwrap();
    run_cli(
        &dir,
        "today 2025-01-01\nsubmit Biology|Cells|a.html\nquery count_subjects\nquery nonsense\nquit\n",
    )
    .success()
    .stdout(str_contains("Biology"))
    .stdout(str_contains("unknown query 'nonsense'"));
}

#[test]
fn cli_review_after_horizon_reports_completion() {
    let dir = tempdir().unwrap();
    run_cli(&dir, "today 2025-03-01\nreview\nquit\n")
        .success()
        .stdout(str_contains("The program has already been completed."));
}
