//! Tests for the mesh builder subcommands.
//!
//! Each test works in its own temporary directory and drives the same
//! functions the binary calls.

use std::fs;
use std::path::{Path, PathBuf};

use mesh_builder::{build, compare, inspect, load_mesh_config};
use test_utils::{configs, temp_dir};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// build
// ============================================================================

#[test]
fn test_build_from_yaml() {
    let dir = temp_dir();
    let config = write(dir.path(), "uniform.yaml", configs::UNIFORM_YAML);
    let output = dir.path().join("mesh.json");

    let summary = build(&config, &output).unwrap();

    assert!(output.exists());
    assert_eq!(summary.cellboxes, 8);
    assert_eq!(summary.graph_nodes, 8);
    assert_eq!(summary.min_id, Some(0));
    assert_eq!(summary.max_id, Some(7));
    assert_eq!(summary.attributes, vec!["dummy_data".to_string()]);
    assert_eq!(summary.cell_width_range, Some([5.0, 5.0]));
    assert!(summary.symmetric);
    assert!(!summary.global);
}

#[test]
fn test_build_from_json_matches_yaml() {
    let dir = temp_dir();
    let value: serde_json::Value = serde_yaml::from_str(configs::CIRCLE_YAML).unwrap();
    let yaml = write(dir.path(), "circle.yaml", configs::CIRCLE_YAML);
    let json = write(dir.path(), "circle.json", &serde_json::to_string(&value).unwrap());

    let from_yaml = dir.path().join("from_yaml.json");
    let from_json = dir.path().join("from_json.json");
    build(&yaml, &from_yaml).unwrap();
    build(&json, &from_json).unwrap();

    let report = compare(&from_yaml, &from_json).unwrap();
    assert!(report.is_match(), "{}", report);
}

#[test]
fn test_build_rejects_unknown_extension() {
    let dir = temp_dir();
    let config = write(dir.path(), "mesh.toml", configs::UNIFORM_YAML);
    let err = build(&config, &dir.path().join("mesh.json")).unwrap_err();
    assert!(err.to_string().contains("Cannot tell the format"));
}

#[test]
fn test_build_rejects_invalid_config() {
    let dir = temp_dir();
    let invalid = configs::UNIFORM_YAML.replace("split_depth: 4", "split_depth: 0");
    let config = write(dir.path(), "invalid.yaml", &invalid);

    let err = load_mesh_config(&config).unwrap_err();
    assert!(err.to_string().contains("Invalid mesh config"));
    assert!(format!("{:#}", err).contains("split_depth"));
}

#[test]
fn test_build_missing_config_file() {
    let dir = temp_dir();
    let err = build(&dir.path().join("absent.yaml"), &dir.path().join("mesh.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read mesh config"));
}

// ============================================================================
// compare
// ============================================================================

#[test]
fn test_compare_detects_edited_mesh() {
    let dir = temp_dir();
    let config = write(dir.path(), "uniform.yaml", configs::UNIFORM_YAML);
    let reference = dir.path().join("reference.json");
    build(&config, &reference).unwrap();

    let mut json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&reference).unwrap()).unwrap();
    json["cellboxes"][3]["dummy_data"] = serde_json::json!(0.75);
    let edited = write(dir.path(), "edited.json", &json.to_string());

    let report = compare(&reference, &edited).unwrap();
    assert_eq!(report.differences.len(), 1);
    assert!(report.to_string().contains("cellbox 3 'dummy_data'"));
}

#[test]
fn test_compare_missing_reference() {
    let dir = temp_dir();
    let err = compare(&dir.path().join("a.json"), &dir.path().join("b.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to load reference mesh"));
}

// ============================================================================
// inspect
// ============================================================================

#[test]
fn test_inspect_global_mesh() {
    let dir = temp_dir();
    let config = write(dir.path(), "global.yml", configs::GLOBAL_GRADIENT_YAML);
    let output = dir.path().join("global.json");
    let built = build(&config, &output).unwrap();

    let summary = inspect(&output).unwrap();
    assert_eq!(summary, built);
    assert!(summary.global);
    assert!(summary.symmetric);

    let [narrowest, widest] = summary.cell_width_range.unwrap();
    assert!(widest <= 40.0);
    assert!(narrowest >= 5.0);

    let text = summary.to_string();
    assert!(text.contains("global:      true"));
    assert!(text.contains("attributes:  dummy_data"));
}
