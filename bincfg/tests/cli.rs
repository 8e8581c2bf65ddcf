use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const APP: &str = "name = \"app\"\nport = 80\n\n[production]\nport = 443\n";

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

#[test]
fn check_reports_ok() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("app.conf");
    write_file(&input, APP);

    cargo_bin_cmd!("cfgtool")
        .arg("check")
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("app.conf: ok"));
}

#[test]
fn check_reports_error_with_line() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("bad.conf");
    write_file(&input, "a = 1\na = 2\n");

    cargo_bin_cmd!("cfgtool")
        .arg("check")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("syntax error:2: \"a\" already exists."));
}

#[test]
fn check_directory_visits_conf_files() {
    let dir = TempDir::new().expect("tempdir");
    write_file(&dir.path().join("a.conf"), APP);
    write_file(&dir.path().join("b.conf"), "[dev]\nlimit = 1KB\n");
    write_file(&dir.path().join("notes.txt"), "not a config");

    cargo_bin_cmd!("cfgtool")
        .arg("check")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("a.conf: ok").and(contains("b.conf: ok")))
        .stdout(contains("notes.txt").not());
}

#[test]
fn check_directory_fails_if_any_file_fails() {
    let dir = TempDir::new().expect("tempdir");
    write_file(&dir.path().join("a.conf"), APP);
    write_file(&dir.path().join("b.conf"), "[_hidden]\n");

    cargo_bin_cmd!("cfgtool")
        .arg("check")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(contains("a.conf: ok"))
        .stderr(contains("can not specify '_' first character"));
}

#[test]
fn json_prints_whole_tree() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("app.conf");
    write_file(&input, "[dev]\nport = 80\nwait = 2s\n");

    cargo_bin_cmd!("cfgtool")
        .arg("json")
        .arg(&input)
        .assert()
        .success()
        .stdout("{\n  \"dev\": {\n    \"port\": 80,\n    \"wait\": 2000\n  }\n}\n");
}

#[test]
fn json_reads_stdin() {
    cargo_bin_cmd!("cfgtool")
        .arg("json")
        .write_stdin("[dev]\nready = true\n")
        .assert()
        .success()
        .stdout(contains("\"ready\": true"));
}

#[test]
fn mode_merges_over_catch_all() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("app.conf");
    write_file(&input, APP);

    cargo_bin_cmd!("cfgtool")
        .args(["--mode", "production", "json"])
        .arg(&input)
        .assert()
        .success()
        .stdout("{\n  \"name\": \"app\",\n  \"port\": 443\n}\n");
}

#[test]
fn mode_without_sections_fails() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("app.conf");
    write_file(&input, "[production]\nport = 443\n");

    cargo_bin_cmd!("cfgtool")
        .args(["-m", "staging", "json"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("no configuration"));
}

#[test]
fn strict_requires_mode_header() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("app.conf");
    write_file(&input, APP);

    cargo_bin_cmd!("cfgtool")
        .args(["--strict", "check"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("syntax error:1: mode name is empty"));
}

#[test]
fn yaml_output() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("app.conf");
    write_file(&input, "[dev]\nhosts = ['a', 'b']\n");

    cargo_bin_cmd!("cfgtool")
        .arg("yaml")
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("dev:").and(contains("- a")).and(contains("- b")));
}

#[test]
fn toml_write_back_uses_extension() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("app.conf");
    write_file(&input, APP);

    cargo_bin_cmd!("cfgtool")
        .args(["-w", "toml"])
        .arg(&input)
        .assert()
        .success();

    let output = fs::read_to_string(dir.path().join("app.toml")).expect("read output");
    assert!(output.contains("[production]"), "{}", output);
    assert!(output.contains("port = 443"), "{}", output);
}

#[test]
fn output_option_writes_file() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("app.conf");
    let output = dir.path().join("out.json");
    write_file(&input, APP);

    cargo_bin_cmd!("cfgtool")
        .arg("json")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout("");

    let written = fs::read_to_string(&output).expect("read output");
    assert!(written.contains("\"_all_\""), "{}", written);
}

#[test]
fn unknown_option_fails() {
    cargo_bin_cmd!("cfgtool")
        .args(["--bogus", "check"])
        .assert()
        .failure()
        .stderr(contains("Unknown option: --bogus"));
}

#[test]
fn unknown_command_fails() {
    cargo_bin_cmd!("cfgtool")
        .arg("xml")
        .assert()
        .failure()
        .stderr(contains("xml sub command unknown"));
}

#[test]
fn version_and_help() {
    cargo_bin_cmd!("cfgtool")
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("cfgtool "));

    cargo_bin_cmd!("cfgtool")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("USAGE:"));
}
