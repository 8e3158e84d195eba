//! Integration tests for the `qaforge` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn packs_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../packs")
}

/// A `qaforge` command isolated in `tmp`: shipped packs, private work dir,
/// no ambient config file in the working directory.
fn qaforge(tmp: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("qaforge");
    cmd.current_dir(tmp.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("QAFORGE__ENGINE__PACKS_DIR", packs_dir())
        .env("QAFORGE__ENGINE__WORK_DIR", tmp.path().join("work"));
    cmd
}

fn write_request(tmp: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

const SELENIUM_REQUEST: &str = r#"{
  "testingType": "Web",
  "tool": "Selenium",
  "language": "Java",
  "testRunner": "JUnit",
  "buildTool": "Maven",
  "scenarios": ["Login"],
  "integrations": { "cicd": "GitHub Actions" }
}"#;

fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn version_flag() {
    let tmp = TempDir::new().unwrap();
    qaforge(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn generate_help_mentions_output() {
    let tmp = TempDir::new().unwrap();
    qaforge(&tmp)
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--no-progress"));
}

#[test]
fn packs_lists_shipped_packs() {
    let tmp = TempDir::new().unwrap();
    let output = qaforge(&tmp)
        .args(["--output-format", "json", "packs"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let packs = json_stdout(&output);
    let ids: Vec<&str> = packs
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    for expected in [
        "playwright-typescript",
        "restassured-java-testng",
        "selenium-java-junit5",
        "selenium-java-testng",
    ] {
        assert!(ids.contains(&expected), "missing {expected} in {ids:?}");
    }
    let fallback: Vec<&Value> = packs
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["fallback"] == true)
        .collect();
    assert_eq!(fallback.len(), 1);
    assert_eq!(fallback[0]["id"], "selenium-java-testng");
}

#[test]
fn packs_shows_one_manifest() {
    let tmp = TempDir::new().unwrap();
    qaforge(&tmp)
        .args(["packs", "selenium-java-junit5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pom.xml.hbs"))
        .stdout(predicate::str::contains("[template]"))
        .stdout(predicate::str::contains("when buildTool"));
}

#[test]
fn generate_download_status_and_delete() {
    let tmp = TempDir::new().unwrap();
    let request = write_request(&tmp, "request.json", SELENIUM_REQUEST);
    let zip_path = tmp.path().join("out/tests.zip");

    let output = qaforge(&tmp)
        .args(["--output-format", "json", "generate"])
        .arg(&request)
        .arg("-o")
        .arg(&zip_path)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = json_stdout(&output);
    assert_eq!(report["status"], "completed");
    assert_eq!(report["progress"], 100);
    assert_eq!(report["pack"], "selenium-java-junit5");
    assert_eq!(report["savedTo"], zip_path.display().to_string());
    let id = report["id"].as_str().unwrap().to_string();

    let archive = zip::ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert!(names.contains(&"pom.xml"));
    assert!(names.contains(&".github/workflows/tests.yml"));
    assert!(!names.contains(&"Jenkinsfile"));

    let output = qaforge(&tmp)
        .args(["--output-format", "json", "status", &id])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["downloadCount"], 1);

    qaforge(&tmp)
        .args(["files", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("pom.xml"));

    qaforge(&tmp)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));

    qaforge(&tmp).args(["delete", &id]).assert().success();

    qaforge(&tmp)
        .args(["status", &id])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("qaforge list"));
}

#[test]
fn existing_output_needs_force() {
    let tmp = TempDir::new().unwrap();
    let request = write_request(&tmp, "request.json", SELENIUM_REQUEST);
    fs::write(tmp.path().join("taken.zip"), b"keep me").unwrap();

    qaforge(&tmp)
        .arg("generate")
        .arg(&request)
        .args(["-o", "taken.zip"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read(tmp.path().join("taken.zip")).unwrap(), b"keep me");
}

#[test]
fn malformed_request_is_a_user_error() {
    let tmp = TempDir::new().unwrap();
    let request = write_request(&tmp, "broken.json", "{ \"tool\": ");

    qaforge(&tmp)
        .arg("generate")
        .arg(&request)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid project configuration"));
}

#[test]
fn missing_required_field_is_a_user_error() {
    let tmp = TempDir::new().unwrap();
    let request = write_request(
        &tmp,
        "partial.json",
        r#"{"testingType": "Web", "language": "Java", "testRunner": "JUnit"}"#,
    );

    qaforge(&tmp)
        .arg("generate")
        .arg(&request)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tool"));
}

#[test]
fn strict_mapping_rejects_unmapped_combination() {
    let tmp = TempDir::new().unwrap();
    let request = write_request(
        &tmp,
        "cypress.json",
        r#"{"testingType": "Web", "tool": "Cypress", "language": "JavaScript", "testRunner": "Mocha"}"#,
    );

    qaforge(&tmp)
        .env("QAFORGE__ENGINE__STRICT_PACK_MAPPING", "true")
        .arg("generate")
        .arg(&request)
        .assert()
        .code(2);
}

#[test]
fn unknown_and_malformed_ids() {
    let tmp = TempDir::new().unwrap();

    qaforge(&tmp)
        .args(["status", "6d2f1a0e-8a4b-4c1e-9a55-3f1f3b7f0c11"])
        .assert()
        .code(3);

    qaforge(&tmp)
        .args(["download", "not-an-id", "-o", "x.zip"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a project id"));
}

#[test]
fn sweep_on_empty_work_dir() {
    let tmp = TempDir::new().unwrap();
    qaforge(&tmp)
        .args(["--output-format", "json", "sweep", "--recover"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"swept\": 0"))
        .stdout(predicate::str::contains("\"recovered\": 0"));
}

#[test]
fn environment_overrides_config() {
    let tmp = TempDir::new().unwrap();
    qaforge(&tmp)
        .env("QAFORGE__ENGINE__TTL_HOURS", "2")
        .args(["config", "get", "engine.ttl_hours"])
        .assert()
        .success()
        .stdout(predicate::str::diff("2\n"));
}

#[test]
fn missing_config_file_is_a_configuration_error() {
    let tmp = TempDir::new().unwrap();
    qaforge(&tmp)
        .args(["--config", "nope.toml", "list"])
        .assert()
        .code(4);
}

#[test]
fn init_local_writes_a_loadable_file() {
    let tmp = TempDir::new().unwrap();
    qaforge(&tmp).args(["init", "--local"]).assert().success();

    let written = fs::read_to_string(tmp.path().join("qaforge.toml")).unwrap();
    assert!(written.contains("[engine]"));
    assert!(written.contains("ttl_hours = 24"));

    qaforge(&tmp)
        .args(["config", "get", "output.format"])
        .assert()
        .success()
        .stdout(predicate::str::diff("auto\n"));
}

#[test]
fn shell_completions() {
    let tmp = TempDir::new().unwrap();
    qaforge(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qaforge"));
}
