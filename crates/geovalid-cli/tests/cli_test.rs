//! Integration tests for the geovalid binary
//!
//! These tests run the compiled binary against documents in a temp directory
//! and check its JSON output.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn geovalid(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_geovalid"))
        .args(args)
        .env_remove("GEOVALID_CRITERIA_INVALID")
        .env_remove("GEOVALID_CRITERIA_PROBLEMATIC")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

fn write_document(dir: &Path, name: &str, document: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(document).unwrap()).unwrap();
    path
}

fn unclosed_triangle() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 1], [1, 0]]]}
        }]
    })
}

#[test]
fn test_validate_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "triangle.geojson", &unclosed_triangle());

    let output = geovalid(&["--json", "validate", path.to_str().unwrap(), "--invalid", "unclosed"]);
    assert!(output.status.success(), "Command should succeed");

    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["invalid"]["unclosed"], json!([0]));
    assert_eq!(parsed["data"]["count_geometry_types"], json!({"Polygon": 1}));
}

#[test]
fn test_validate_unknown_criterion_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "triangle.geojson", &unclosed_triangle());

    let output = geovalid(&["validate", path.to_str().unwrap(), "--invalid", "zero_length"]);
    assert!(!output.status.success(), "Unknown criteria should be rejected");
}

#[test]
fn test_validate_rejects_wrong_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "triangle.txt", &unclosed_triangle());

    let output = geovalid(&["validate", path.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn test_fix_writes_closed_ring() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_document(dir.path(), "triangle.geojson", &unclosed_triangle());
    let fixed_path = dir.path().join("fixed.geojson");

    let output = geovalid(&[
        "fix",
        path.to_str().unwrap(),
        "--output",
        fixed_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Command should succeed");

    let fixed: Value = serde_json::from_str(&fs::read_to_string(&fixed_path).unwrap()).unwrap();
    let ring = &fixed["features"][0]["geometry"]["coordinates"][0];
    assert_eq!(ring.as_array().unwrap().len(), 4);
    assert_eq!(ring[0], ring[3]);
}

#[test]
fn test_lint_reports_positions() {
    let dir = tempfile::tempdir().unwrap();
    let document = json!({
        "type": "FeatureCollection",
        "features": [{"type": "NotFeature", "properties": {}, "geometry": null}]
    });
    let path = write_document(dir.path(), "broken.json", &document);

    let output = geovalid(&["--json", "lint", path.to_str().unwrap()]);
    assert!(output.status.success(), "Structural problems are not a failure");

    let parsed = stdout_json(&output);
    assert_eq!(parsed["data"]["valid"], false);
    assert_eq!(parsed["data"]["diagnostics"][0]["path"], "/features/0/type");
    assert_eq!(parsed["data"]["diagnostics"][0]["feature"], 0);
}

#[test]
fn test_criteria_lists_registry() {
    let output = geovalid(&["--json", "criteria"]);
    assert!(output.status.success());

    let parsed = stdout_json(&output);
    let criteria = parsed["data"].as_array().unwrap();
    assert_eq!(criteria.len(), 13);
    assert_eq!(criteria[0]["name"], "unclosed");
}
