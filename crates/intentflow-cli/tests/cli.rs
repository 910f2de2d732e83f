//! End-to-end tests for the `intentflow` binary.
//!
//! Every command runs with provider keys removed so synthesis stays in demo
//! mode and nothing touches the network.

use std::path::Path;
use std::process::{Command, Output};

fn intentflow(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_intentflow"))
        .args(args)
        .current_dir(cwd)
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("INTENTFLOW_GATE_CONDITIONS")
        .env("RUST_LOG", "warn")
        .output()
        .expect("binary should start")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn catalog_lists_types() {
    let dir = tempfile::tempdir().unwrap();
    let output = intentflow(&["catalog"], dir.path());
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("ManualQuickTrigger"));
    assert!(text.contains("SendSMSAction"));
}

#[test]
fn synthesize_validate_run_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let flow = dir.path().join("flow.json");
    let flow_arg = flow.to_str().unwrap();

    let output = intentflow(&["synthesize", "Guard my desk", "--out", flow_arg], dir.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let response: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(response["graph"]["title"], "Intruder Alert");
    assert!(flow.exists());

    let output = intentflow(&["validate", flow_arg], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("valid: \"Intruder Alert\" (5 blocks, 4 edges"));

    let output = intentflow(&["run", flow_arg, "--meta", "step_count=9"], dir.path());
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Photo saved"));
    assert!(text.contains("5 step(s): 5 succeeded, 0 skipped, 0 failed"));

    let output = intentflow(&["run", flow_arg, "-m", "step_count=1", "--gate-conditions"], dir.path());
    assert!(output.status.success());
    assert!(stdout(&output).contains("2 step(s): 1 succeeded, 1 skipped, 0 failed"));
}

#[test]
fn invalid_flow_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let flow = dir.path().join("bad.json");
    std::fs::write(
        &flow,
        r#"{"id":"g","title":"t","explanation":"e","blocks":[{"id":"a","type":"Camera"}],"edges":[]}"#,
    )
    .unwrap();

    let output = intentflow(&["validate", flow.to_str().unwrap()], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no trigger blocks found"));
}

#[test]
fn gate_conditions_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("intentflow.toml");
    std::fs::write(&config, "[engine]\ngate_conditions = true\n").unwrap();
    let flow = dir.path().join("flow.json");
    std::fs::write(
        &flow,
        r#"{"id":"g","title":"t","explanation":"e",
            "blocks":[{"id":"t","type":"ManualQuickTrigger"},
                      {"id":"c","type":"ContextMatchCondition","params":{"value":"home"}},
                      {"id":"s","type":"PlaySoundAction"}],
            "edges":[{"from":"t","to":"c"},{"from":"c","to":"s"}]}"#,
    )
    .unwrap();

    let output = intentflow(
        &["--config", config.to_str().unwrap(), "run", flow.to_str().unwrap(), "-m", "context=office"],
        dir.path(),
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("2 step(s)"));
}
