//! Integration tests for the `refdoc` binary.
//!
//! Each test writes a small document set into a temporary directory and
//! runs the binary against it. `REFDOC_*` and `GITHUB_PRIVATE_REPOS` are
//! removed from the child environment so the host cannot leak settings in.

use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn refdoc(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("refdoc");
    cmd.current_dir(dir)
        .env_remove("REFDOC_PACKAGE_ROOT")
        .env_remove("REFDOC_HTTP_TIMEOUT")
        .env_remove("REFDOC_LOG_FORMAT")
        .env_remove("GITHUB_PRIVATE_REPOS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_resolve_prints_json() {
    let dir = TempDir::new().unwrap();
    let main = write(&dir, "main.json", r##"{"a": {"$ref": "#/b"}, "b": {"x": 1}}"##);

    let assert = refdoc(dir.path())
        .args(["--output", "json", "resolve", &main])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value, json!({"a": {"x": 1}, "b": {"x": 1}}));
}

#[test]
fn test_resolve_with_anchor_as_yaml() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.yaml",
        "server:\n  $ref: common/servers.json#/prod\n",
    );
    write(&dir, "common/servers.json", r#"{"prod": {"host": "prod.example.com"}}"#);

    refdoc(dir.path())
        .args(["-o", "yaml", "resolve", "main.yaml#/server"])
        .assert()
        .success()
        .stdout("host: prod.example.com\n");
}

#[test]
fn test_resolve_package_name_with_root_flag() {
    let dir = TempDir::new().unwrap();
    write(&dir, "suites/main.yaml", "checks:\n  $ref: suites.common\n");
    write(&dir, "suites/common.json", r#"{"enabled": true}"#);
    let root = dir.path().to_str().unwrap();

    refdoc(Path::new("/"))
        .args(["--package-root", root, "-o", "json", "resolve", "suites.main"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"checks":{"enabled":true}}"#));
}

#[test]
fn test_resolve_select_path_query() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.yaml",
        "servers:\n  - host.name: first\n  - $ref: '#/backup'\nbackup:\n  host.name: second\n",
    );

    refdoc(dir.path())
        .args(["-o", "json", "resolve", "main.yaml", "--select", "$.servers[1]['host.name']"])
        .assert()
        .success()
        .stdout("\"second\"\n");

    refdoc(dir.path())
        .args(["--no-color", "resolve", "main.yaml", "--select", "$.servers[5]"])
        .assert()
        .failure()
        .code(21);

    refdoc(dir.path())
        .args(["--no-color", "resolve", "main.yaml", "--select", "$.servers]"])
        .assert()
        .failure()
        .code(21)
        .stderr(predicate::str::contains("Invalid path expression"));
}

#[test]
fn test_resolve_saves_to_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "main.json", r##"{"a": {"allOf": [{"$ref": "#/b"}, {"$ref": "#/c"}]}, "b": {"x": 1}, "c": {"y": 2}}"##);

    refdoc(dir.path())
        .args(["resolve", "main.json", "--save-to", "out.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("written to out.yaml"));

    let saved = fs::read_to_string(dir.path().join("out.yaml")).unwrap();
    let value: Value = serde_yaml::from_str(&saved).unwrap();
    assert_eq!(value["a"], json!({"x": 1, "y": 2}));
}

#[test]
fn test_refs_lists_edges_in_resolution_order() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "main.json",
        r##"{"a": {"$ref": "#/b"}, "b": {"$ref": "#/c"}, "c": {"v": 1}, "d": {"$ref": "other.json"}, "g": {"allOf": [{"$ref": "#/c"}]}}"##,
    );

    let assert = refdoc(dir.path())
        .args(["-o", "json", "refs", "main.json"])
        .assert()
        .success();

    let report: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let paths: Vec<&str> = report["refs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["$.d", "$.b", "$.a", "$.g.allOf[0]"]);
    assert_eq!(report["refs"][0]["internal"], json!(false));
    assert_eq!(report["all_of"], json!(["$.g.allOf"]));
}

#[test]
fn test_refs_human_output() {
    let dir = TempDir::new().unwrap();
    write(&dir, "main.yaml", "a:\n  $ref: '#/b'\nb: {}\n");

    refdoc(dir.path())
        .args(["--no-color", "refs", "main.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== References in main.yaml ==="))
        .stdout(predicate::str::contains("1. $.a -> #/b (internal)"));
}

#[test]
fn test_content_is_printed_raw() {
    let dir = TempDir::new().unwrap();
    let raw = "# comment kept\na:\n  $ref: '#/b'\nb: 1\n";
    write(&dir, "main.yaml", raw);

    refdoc(dir.path())
        .args(["content", "main.yaml"])
        .assert()
        .success()
        .stdout(raw);
}

#[test]
fn test_package_name() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "suites/uspace/flight_auth.yaml", "a: 1\n");
    let root = dir.path().to_str().unwrap();

    refdoc(dir.path())
        .args(["--package-root", root, "package-name", &file])
        .assert()
        .success()
        .stdout("suites.uspace.flight_auth\n");
}

#[test]
fn test_circular_reference_exit_code() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.yaml", "b_ref:\n  $ref: b.yaml\n");
    write(&dir, "b.yaml", "a_ref:\n  $ref: a.yaml\n");

    refdoc(dir.path())
        .args(["--no-color", "resolve", "a.yaml"])
        .assert()
        .failure()
        .code(20)
        .stderr(predicate::str::contains("Error: Circular reference detected"));
}

#[test]
fn test_missing_anchor_key_exit_code() {
    let dir = TempDir::new().unwrap();
    write(&dir, "main.yaml", "foo: {}\n");

    refdoc(dir.path())
        .args(["--no-color", "resolve", "main.yaml#/foo/bar"])
        .assert()
        .failure()
        .code(21)
        .stderr(predicate::str::contains("Could not find key 'bar'"));
}

#[test]
fn test_template_without_engine_fails() {
    let dir = TempDir::new().unwrap();
    write(&dir, "gen.jsonnet", "{}");

    refdoc(dir.path())
        .args(["--no-color", "resolve", "gen.jsonnet"])
        .assert()
        .failure()
        .code(22);
}

#[test]
fn test_zero_max_depth_is_rejected() {
    let dir = TempDir::new().unwrap();

    refdoc(dir.path())
        .args(["--max-depth", "0", "resolve", "main.yaml"])
        .assert()
        .failure()
        .code(6)
        .stderr(predicate::str::contains("--help"));
}
