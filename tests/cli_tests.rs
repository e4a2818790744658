//! Integration tests for the agentplan CLI
//!
//! These tests run the actual CLI binary and verify output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CHAIN: &str = "Fetch data, then extract fields, then notify team.";

/// Get the binary to test
fn agentplan_cmd() -> Command {
    let mut cmd = Command::cargo_bin("agentplan").unwrap();
    cmd.env_remove("AGENTPLAN_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Write the support-triage template plan into `dir`
fn write_template_plan(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("triage.json");
    let output = agentplan_cmd()
        .args(["plan", "Route support tickets", "--template", "support-triage"])
        .output()
        .unwrap();
    assert!(output.status.success());
    fs::write(&path, output.stdout).unwrap();
    path
}

const CYCLIC_PLAN: &str = r#"{
  "version": "1.0",
  "title": "Loop",
  "description": "",
  "agents": [
    { "id": "a", "name": "A", "type": "Generator", "summary": "", "outputs": [{ "name": "x" }] },
    { "id": "b", "name": "B", "type": "Generator", "summary": "", "outputs": [{ "name": "y" }] }
  ],
  "edges": [
    { "from": "a", "to": "b", "data": "x" },
    { "from": "b", "to": "a", "data": "y" }
  ]
}"#;

#[test]
fn test_help_flag() {
    agentplan_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("agent DAG plans"))
        .stdout(predicate::str::contains("templates"));
}

// ============================================================================
// plan / templates
// ============================================================================

#[test]
fn test_plan_prints_json() {
    let output = agentplan_cmd().args(["plan", CHAIN]).output().unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["agents"].as_array().unwrap().len(), 3);
    assert_eq!(plan["agents"][0]["id"], "retriever_1");
    assert_eq!(plan["agents"][0]["type"], "Retriever");
    assert_eq!(plan["edges"][0]["data"], "data_output");
    assert_eq!(plan["agents"][1]["inputs"][0]["sourceAgentId"], "retriever_1");
}

#[test]
fn test_plan_flow_format() {
    agentplan_cmd()
        .args(["plan", CHAIN, "--format", "flow"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("flowchart LR"))
        .stdout(predicate::str::contains("retriever_1 -->|\"data output\"| extractor_2"));
}

#[test]
fn test_plan_layout_format() {
    agentplan_cmd()
        .args(["plan", CHAIN, "--format", "layout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nodes\""))
        .stdout(predicate::str::contains("\"unleveled\": []"));
}

#[test]
fn test_plan_unknown_template_fails_with_fix() {
    agentplan_cmd()
        .args(["plan", "anything", "--template", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLAN-020"))
        .stderr(predicate::str::contains("Unknown template \"nope\""))
        .stderr(predicate::str::contains(
            "available: support-triage, lead-qualification, weekly-report",
        ))
        .stderr(predicate::str::contains("agentplan templates"));
}

#[test]
fn test_plan_out_dir_uses_title() {
    let temp_dir = TempDir::new().unwrap();
    agentplan_cmd()
        .args(["plan", "Route support tickets", "--template", "support-triage", "--out"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved plan"));

    let saved = temp_dir.path().join("customer-support-triage-workflow.json");
    let text = fs::read_to_string(saved).unwrap();
    assert!(text.contains("\"ticket_intake\""));
    assert!(text.contains("Route support tickets"));
}

#[test]
fn test_templates_lists_keys_in_order() {
    let output = agentplan_cmd().arg("templates").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    let triage = stdout.find("support-triage").unwrap();
    let lead = stdout.find("lead-qualification").unwrap();
    let weekly = stdout.find("weekly-report").unwrap();
    assert!(triage < lead && lead < weekly);
}

// ============================================================================
// validate / layout / export
// ============================================================================

#[test]
fn test_validate_valid_plan() {
    let temp_dir = TempDir::new().unwrap();
    let plan_file = write_template_plan(&temp_dir);

    agentplan_cmd()
        .arg("validate")
        .arg(&plan_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Agents: 5"));
}

#[test]
fn test_validate_cyclic_plan_fails() {
    let temp_dir = TempDir::new().unwrap();
    let plan_file = temp_dir.path().join("loop.json");
    fs::write(&plan_file, CYCLIC_PLAN).unwrap();

    agentplan_cmd()
        .arg("validate")
        .arg(&plan_file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[Graph] Cycle detected: a → b → a"))
        .stdout(predicate::str::contains("Fix: Remove one edge of the cycle"))
        .stderr(predicate::str::contains("1 error(s)"));
}

#[test]
fn test_validate_malformed_document() {
    let temp_dir = TempDir::new().unwrap();
    let plan_file = temp_dir.path().join("bad.json");
    fs::write(
        &plan_file,
        r#"{ "version": "1.0", "title": "x", "description": "", "agents": [{ "id": "a" }], "edges": [] }"#,
    )
    .unwrap();

    agentplan_cmd()
        .arg("validate")
        .arg(&plan_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLAN-030"))
        .stderr(predicate::str::contains("/agents/0"));
}

#[test]
fn test_validate_missing_file() {
    agentplan_cmd()
        .args(["validate", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load plan"));
}

#[test]
fn test_layout_command() {
    let temp_dir = TempDir::new().unwrap();
    let plan_file = write_template_plan(&temp_dir);

    let output = agentplan_cmd().arg("layout").arg(&plan_file).output().unwrap();
    assert!(output.status.success());
    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layout["nodes"].as_array().unwrap().len(), 5);
    assert_eq!(layout["nodes"][0]["x"], 0.0);
    assert_eq!(layout["nodes"][4]["level"], 3);
}

#[test]
fn test_layout_uses_config_metrics() {
    let temp_dir = TempDir::new().unwrap();
    let plan_file = write_template_plan(&temp_dir);
    let config = temp_dir.path().join("custom.yaml");
    fs::write(&config, "layout:\n  node_width: 100\n  horizontal_gap: 0\n").unwrap();

    let output = agentplan_cmd()
        .arg("--config")
        .arg(&config)
        .arg("layout")
        .arg(&plan_file)
        .output()
        .unwrap();
    assert!(output.status.success());
    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layout["nodes"][1]["x"], 100.0);
}

#[test]
fn test_bad_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("broken.yaml");
    fs::write(&config, "layout: [1, 2\n").unwrap();

    agentplan_cmd()
        .arg("--config")
        .arg(&config)
        .arg("templates")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLAN-040"));
}

#[test]
fn test_export_sequence_diagram() {
    let temp_dir = TempDir::new().unwrap();
    let plan_file = write_template_plan(&temp_dir);

    agentplan_cmd()
        .arg("export")
        .arg(&plan_file)
        .args(["--diagram", "sequence"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("sequenceDiagram"))
        .stdout(predicate::str::contains("User->>ticket_intake: start"))
        .stdout(predicate::str::contains("customer_notifier-->>User: complete"));
}

#[test]
fn test_export_json_dir() {
    let temp_dir = TempDir::new().unwrap();
    let plan_file = write_template_plan(&temp_dir);
    let out_dir = temp_dir.path().join("exports");

    agentplan_cmd()
        .arg("export")
        .arg(&plan_file)
        .arg("--json-dir")
        .arg(&out_dir)
        .assert()
        .success();

    assert!(out_dir.join("customer-support-triage-workflow.json").exists());
}

#[test]
fn test_export_requires_a_target() {
    let temp_dir = TempDir::new().unwrap();
    let plan_file = write_template_plan(&temp_dir);

    agentplan_cmd().arg("export").arg(&plan_file).assert().failure();
}

// ============================================================================
// request
// ============================================================================

#[test]
fn test_request_from_stdin() {
    let output = agentplan_cmd()
        .arg("request")
        .write_stdin(format!(r#"{{"description": "{}"}}"#, CHAIN))
        .output()
        .unwrap();
    assert!(output.status.success());

    let response: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["status"], 200);
    assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");
    assert_eq!(response["body"]["plan"]["agents"].as_array().unwrap().len(), 3);
    assert_eq!(response["body"]["warnings"], serde_json::json!([]));
}

#[test]
fn test_request_short_description() {
    let temp_dir = TempDir::new().unwrap();
    let request = temp_dir.path().join("request.json");
    fs::write(&request, r#"{"description": "hi"}"#).unwrap();

    agentplan_cmd()
        .arg("request")
        .arg(&request)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"status\": 400"))
        .stdout(predicate::str::contains("at least 10 characters"));
}

#[test]
fn test_request_unknown_template() {
    agentplan_cmd()
        .arg("request")
        .write_stdin(r#"{"description": "Something long enough", "templateId": "nope"}"#)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown template \\\"nope\\\""));
}
