//! Tests for the `docdts` command line.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::json;
use tempfile::tempdir;

fn docdts() -> Command {
    Command::new(env!("CARGO_BIN_EXE_docdts"))
}

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let data = json!({
        "classes": {
            "Ember.View": { "name": "Ember.View", "uses": ["Ember.Missing"] }
        },
        "classitems": [
            { "class": "Ember.View", "name": "rerender", "itemtype": "method", "chainable": true }
        ]
    });
    let path = dir.join("data.json");
    fs::write(&path, data.to_string()).unwrap();
    path
}

#[test]
fn generates_to_stdout() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let output = docdts().arg(&input).current_dir(dir.path()).output().unwrap();

    assert!(output.status.success(), "command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("declare namespace Ember {"),
        "unexpected output:\n{}",
        stdout
    );
    assert!(stdout.contains("rerender(): this;"));
    assert!(stdout.ends_with("export default Ember;\n"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 classes"), "unexpected stderr:\n{}", stderr);
}

#[test]
fn writes_output_and_report_files() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());
    let out_path = dir.path().join("ember.d.ts");
    let report_path = dir.path().join("report.md");

    let status = docdts()
        .arg(&input)
        .arg("-o")
        .arg(&out_path)
        .arg("--report")
        .arg(&report_path)
        .arg("--export-name")
        .arg("Em")
        .current_dir(dir.path())
        .status()
        .unwrap();

    assert!(status.success());
    let code = fs::read_to_string(&out_path).unwrap();
    assert!(code.ends_with("export default Em;\n"));
    let report = fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("# docdts report"));
    assert!(report.contains("Ember.Missing"));
}

#[test]
fn reads_stdin() {
    let dir = tempdir().unwrap();
    let mut child = docdts()
        .arg("-")
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{ "classes": { "DS.Model": { "name": "DS.Model" } } }"#)
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("declare namespace DS {"));
}

#[test]
fn config_file_is_applied() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());
    fs::write(
        dir.path().join("docdts.toml"),
        "export_name = \"App\"\nindent = 2\nverbose = true\n",
    )
    .unwrap();

    let output = docdts().arg(&input).current_dir(dir.path()).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\n  class View {\n"), "unexpected output:\n{}", stdout);
    assert!(stdout.contains("// WARNINGS:"));
    assert!(stdout.ends_with("export default App;\n"));
}

#[test]
fn deny_warnings_fails_the_run() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let output = docdts()
        .arg(&input)
        .arg("--deny-warnings")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--deny-warnings"));
}

#[test]
fn invalid_input_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let output = docdts().arg(&path).current_dir(dir.path()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse"), "unexpected stderr:\n{}", stderr);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path());

    let output = docdts()
        .arg(&input)
        .arg("-c")
        .arg(dir.path().join("nope.toml"))
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}
