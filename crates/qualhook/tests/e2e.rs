// End-to-end tests for the qualhook binary: the exit-code protocol and
// stdout/stderr contract, driven through real config files and child
// processes.

use std::path::Path;
use std::process::{Command, Output};

/// A [`Command`] for the built qualhook binary with CWD and HOME pinned
/// to the given temp directory and all qualhook env inputs cleared, so
/// discovery never escapes the test sandbox.
fn qualhook_cmd(tmp: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qualhook"));
    cmd.current_dir(tmp)
        .env("HOME", tmp)
        .env_remove("QUALHOOK_CONFIG")
        .env_remove("CLAUDE_HOOK_INPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(tmp: &Path, json: &str) {
    std::fs::write(tmp.join(".qualhook.json"), json).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn happy_path_exits_zero_with_success_banner() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{
          "version": "1.0",
          "commands": {
            "lint": {
              "command": "echo",
              "args": ["ok"],
              "errorDetection": {"exitCodes": [1], "patterns": [{"pattern": "error"}]}
            }
          }
        }"#,
    );

    let output = qualhook_cmd(tmp.path()).arg("lint").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("All quality checks passed successfully"));
    assert!(stderr(&output).is_empty());
}

#[test]
fn pattern_matched_tool_error_exits_two() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{
          "version": "1.0",
          "commands": {
            "format": {
              "command": "echo",
              "args": ["Error: File not formatted: main.js"],
              "prompt": "Fix the formatting issues below:",
              "errorDetection": {"exitCodes": [0]},
              "outputFilter": {"errorPatterns": [{"pattern": "Error:"}]}
            }
          }
        }"#,
    );

    let output = qualhook_cmd(tmp.path()).arg("format").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("Fix the formatting issues below:"));
    assert!(err.contains("Error: File not formatted: main.js"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn exit_code_tool_error_exits_two() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("exit1.sh"), "exit 1\n").unwrap();
    write_config(
        tmp.path(),
        r#"{
          "version": "1.0",
          "commands": {
            "lint": {
              "command": "sh",
              "args": ["exit1.sh"],
              "errorDetection": {"exitCodes": [1]}
            }
          }
        }"#,
    );

    let output = qualhook_cmd(tmp.path()).arg("lint").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty());
}

#[test]
fn monorepo_routing_runs_only_the_matching_component() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{
          "version": "1.0",
          "commands": {
            "lint": {
              "command": "echo",
              "args": ["rootmarker"],
              "errorDetection": {"exitCodes": [0]}
            }
          },
          "paths": [
            {
              "path": "frontend/**",
              "commands": {
                "lint": {
                  "command": "echo",
                  "args": ["frontendmarker"],
                  "errorDetection": {"exitCodes": [0]}
                }
              }
            }
          ]
        }"#,
    );

    let hook_input = serde_json::json!({
        "session_id": "sess-1",
        "transcript_path": "/tmp/t.jsonl",
        "cwd": tmp.path().to_string_lossy(),
        "hook_event_name": "PostToolUse",
        "tool_use": {"name": "edit", "input": {"file_path": "frontend/app.js"}}
    });

    let output = qualhook_cmd(tmp.path())
        .arg("lint")
        .env("CLAUDE_HOOK_INPUT", hook_input.to_string())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("frontendmarker"));
    assert!(!err.contains("rootmarker"));
}

#[test]
fn hook_input_with_absolute_path_routes_like_relative() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{
          "version": "1.0",
          "commands": {
            "lint": {"command": "echo", "args": ["rootmarker"], "errorDetection": {"exitCodes": [0]}}
          },
          "paths": [
            {
              "path": "frontend/**",
              "commands": {
                "lint": {"command": "echo", "args": ["frontendmarker"], "errorDetection": {"exitCodes": [0]}}
              }
            }
          ]
        }"#,
    );

    let absolute = tmp.path().join("frontend/app.js");
    let hook_input = serde_json::json!({
        "session_id": "sess-1",
        "cwd": tmp.path().to_string_lossy(),
        "hook_event_name": "PostToolUse",
        "tool_use": {"name": "Write", "input": {"file_path": absolute.to_string_lossy()}}
    });

    let output = qualhook_cmd(tmp.path())
        .arg("lint")
        .env("CLAUDE_HOOK_INPUT", hook_input.to_string())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("frontendmarker"));
}

#[test]
fn missing_config_exits_one_with_banner() {
    let tmp = tempfile::tempdir().unwrap();
    let output = qualhook_cmd(tmp.path()).arg("lint").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("[QUALHOOK ERROR]"));
    assert!(err.contains("no configuration file found"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn shell_injection_in_config_is_blocked_at_load() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{"version": "1.0", "commands": {"lint": {"command": "echo; rm -rf /"}}}"#,
    );

    let output = qualhook_cmd(tmp.path()).arg("lint").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("[QUALHOOK ERROR]"));
    assert!(err.contains("shell injection"));
}

#[test]
fn unknown_command_exits_one() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{"version": "1.0", "commands": {"lint": {"command": "echo"}}}"#,
    );

    let output = qualhook_cmd(tmp.path()).arg("no-such-check").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no command named 'no-such-check'"));
}

#[test]
fn custom_command_from_config_runs() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{
          "version": "1.0",
          "commands": {
            "spellcheck": {"command": "echo", "args": ["clean"], "errorDetection": {"exitCodes": [1]}}
          }
        }"#,
    );

    let output = qualhook_cmd(tmp.path()).arg("spellcheck").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("All quality checks passed successfully"));
}

#[test]
fn extra_cli_args_are_appended_to_configured_args() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{
          "version": "1.0",
          "commands": {
            "lint": {"command": "echo", "args": ["base"], "errorDetection": {"exitCodes": [0]}}
          }
        }"#,
    );

    let output = qualhook_cmd(tmp.path())
        .args(["lint", "extra-arg"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("base extra-arg"));
}

#[test]
fn command_timeout_surfaces_as_qualhook_error() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{
          "version": "1.0",
          "commands": {
            "test": {"command": "sleep", "args": ["10"], "timeout": 300}
          }
        }"#,
    );

    let output = qualhook_cmd(tmp.path()).arg("test").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("timed out after 300 ms"));
}

#[test]
fn newer_config_version_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(tmp.path(), r#"{"version": "3.0", "commands": {}}"#);

    let output = qualhook_cmd(tmp.path()).arg("lint").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("newer than the supported"));
}

#[test]
fn config_validate_reports_ok() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{"version": "1.0", "commands": {"lint": {"command": "echo"}}}"#,
    );

    let output = qualhook_cmd(tmp.path())
        .args(["config", "validate"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("configuration OK (1 commands, 0 paths)"));
}

#[test]
fn config_validate_reports_failures() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{"version": "1.0", "commands": {"lint": {"command": "echo", "timeout": 99}}}"#,
    );

    let output = qualhook_cmd(tmp.path())
        .args(["config", "validate"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("below the minimum"));
}

#[test]
fn config_show_prints_canonical_json() {
    let tmp = tempfile::tempdir().unwrap();
    write_config(
        tmp.path(),
        r#"{
          "version": "1.0",
          "commands": {
            "typecheck": {"command": "tsc"},
            "format": {"command": "prettier"}
          }
        }"#,
    );

    let output = qualhook_cmd(tmp.path())
        .args(["config", "show"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let rendered = stdout(&output);
    // Sorted command keys
    let format_at = rendered.find("\"format\"").unwrap();
    let typecheck_at = rendered.find("\"typecheck\"").unwrap();
    assert!(format_at < typecheck_at);
    // Round-trips as valid JSON
    serde_json::from_str::<serde_json::Value>(&rendered).unwrap();
}

#[test]
fn qualhook_config_env_overrides_discovery() {
    let tmp = tempfile::tempdir().unwrap();
    let elsewhere = tmp.path().join("elsewhere");
    std::fs::create_dir(&elsewhere).unwrap();
    std::fs::write(
        elsewhere.join("alt.json"),
        r#"{"version": "1.0", "commands": {"lint": {"command": "echo", "args": ["from-env-config"], "errorDetection": {"exitCodes": [0]}}}}"#,
    )
    .unwrap();

    let output = qualhook_cmd(tmp.path())
        .arg("lint")
        .env("QUALHOOK_CONFIG", elsewhere.join("alt.json"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("from-env-config"));
}
