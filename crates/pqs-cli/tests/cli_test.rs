//! E2E tests for pqstore subcommands

use std::process::Command;

/// Helper to get the cargo binary path for pqs-cli
fn pqstore_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "pqs-cli", "--"]);
    cmd
}

const POLICY: &str = "../../policy/authz.rego";
const DATA: &str = "../../policy/data.json";
const INPUT: &str = "../../policy/input.json";
const RESIDUAL_AUTHZ: &str = "../../policy/residual/authz.rego";
const RESIDUAL_SUPPORT: &str = "../../policy/residual/support.rego";

fn encode_two_modules(out: &std::path::Path) {
    let output = pqstore_bin()
        .args([
            "encode",
            "-q",
            "data.partial.authz.allow",
            "-m",
            RESIDUAL_AUTHZ,
            "-m",
            RESIDUAL_SUPPORT,
            "-o",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run pqstore encode");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 modules"), "stdout: {}", stdout);
}

// ============================================================
// Encode / Inspect / Validate
// ============================================================

#[test]
fn test_encode_then_inspect_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial_queries");
    encode_two_modules(&out);

    let output = pqstore_bin()
        .args(["inspect", "-f", out.to_str().unwrap(), "--format", "json"])
        .output()
        .expect("failed to run pqstore inspect");
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("inspect output should be JSON");
    let modules = parsed["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0]["package"], "partial.authz");
    assert_eq!(modules[1]["package"], "partial.support");
}

#[test]
fn test_encode_no_clobber_refuses_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial_queries");
    encode_two_modules(&out);

    let output = pqstore_bin()
        .args([
            "encode",
            "-q",
            "data.partial.authz.allow",
            "-m",
            RESIDUAL_AUTHZ,
            "-m",
            RESIDUAL_SUPPORT,
            "-o",
            out.to_str().unwrap(),
            "--no-clobber",
        ])
        .output()
        .expect("failed to run pqstore encode");
    assert!(!output.status.success());
}

#[test]
fn test_encode_rejects_dangling_query() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial_queries");
    let output = pqstore_bin()
        .args([
            "encode",
            "-q",
            "data.partial.authz.allow",
            "-o",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run pqstore encode");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("encoding error"), "stderr: {}", stderr);
    assert!(!out.exists());
}

#[test]
fn test_validate_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial_queries");
    std::fs::write(&path, b"{\"Query\": \"x\", \"Support\": \"y\"}").unwrap();

    let output = pqstore_bin()
        .args(["validate", "-f", path.to_str().unwrap()])
        .output()
        .expect("failed to run pqstore validate");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("decode stage"), "stderr: {}", stderr);
}

// ============================================================
// Eval / Run
// ============================================================

#[test]
fn test_eval_residual_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial_queries");
    encode_two_modules(&out);

    let output = pqstore_bin()
        .args([
            "eval",
            "-f",
            out.to_str().unwrap(),
            "--input-json",
            r#"{"user": "alice"}"#,
            "--format",
            "json",
        ])
        .output()
        .expect("failed to run pqstore eval");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["rows"][0]["expressions"][0], true);
}

#[test]
fn test_run_round_trip_matches() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial_queries");

    let output = pqstore_bin()
        .args([
            "run",
            "--policy",
            POLICY,
            "--query",
            "data.authz.allow",
            "-i",
            INPUT,
            "-d",
            DATA,
            "--residual-query",
            "data.partial.authz.allow",
            "--support",
            RESIDUAL_AUTHZ,
            "--support",
            RESIDUAL_SUPPORT,
            "-o",
            out.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run pqstore run");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("1st ResultSet"), "stdout: {}", stdout);
    assert!(stdout.contains("2nd ResultSet"), "stdout: {}", stdout);
    assert!(stdout.contains("matches original"), "stdout: {}", stdout);
    assert!(out.exists());
}

#[test]
fn test_run_two_conjunct_residual_matches() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("partial_queries");

    for user in ["alice", "bob"] {
        let input = format!(r#"{{"user":"{}"}}"#, user);
        let output = pqstore_bin()
            .args([
                "run",
                "--policy",
                POLICY,
                "-d",
                DATA,
                "--input-json",
                &input,
                "--residual-query",
                "input.user == \"alice\"",
                "--residual-query",
                "data.partial.authz.allow",
                "--support",
                RESIDUAL_AUTHZ,
                "--support",
                RESIDUAL_SUPPORT,
                "-o",
                out.to_str().unwrap(),
            ])
            .output()
            .expect("failed to run pqstore run");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            output.status.success(),
            "user {}: stdout: {}\nstderr: {}",
            user,
            stdout,
            String::from_utf8_lossy(&output.stderr)
        );
        assert!(stdout.contains("matches original"), "stdout: {}", stdout);
    }
}

#[test]
fn test_run_missing_policy_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = pqstore_bin()
        .args([
            "run",
            "--policy",
            dir.path().join("missing.rego").to_str().unwrap(),
            "--residual-query",
            "input.user == \"alice\"",
            "-o",
            dir.path().join("partial_queries").to_str().unwrap(),
        ])
        .output()
        .expect("failed to run pqstore run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load policy"), "stderr: {}", stderr);
}
