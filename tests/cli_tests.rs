//! Integration tests for CLI wiring.
//!
//! These tests validate that the CLI is a thin adapter over the batch API
//! with the expected console report and exit codes.

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use std::process::{Command, Output};
    use switchfix::config::DEFAULT_TARGETS;
    use tempfile::TempDir;

    const EXERCISE: &str = r#"class PlaceNumbersExercise {
  Widget build(BuildContext context) {
    switch (widget.currentLevel) {
      case ScaffoldLevel.guidedExploration:
        return _guided();
      case ScaffoldLevel.independentMastery:
        return _mastery();
    }
  }
}
"#;

    fn switchfix(root: &Path, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_switchfix"))
            .args(args)
            .current_dir(root)
            .output()
            .expect("Failed to execute switchfix")
    }

    fn stdout_lines(output: &Output) -> Vec<String> {
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Running with no arguments processes the embedded target list.
    #[test]
    fn test_cli_default_run_reports_each_file() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let root = workspace.path();
        let present = DEFAULT_TARGETS[1];
        let path = root.join(present);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(&path, EXERCISE).expect("write target");

        let output = switchfix(root, &[]);
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

        let lines = stdout_lines(&output);
        assert_eq!(lines.len(), DEFAULT_TARGETS.len() + 2);
        assert_eq!(lines[0], format!("Skipping {} (not found)", DEFAULT_TARGETS[0]));
        assert_eq!(lines[1], format!("Updated {}", present));
        assert_eq!(lines[DEFAULT_TARGETS.len()], "1 updated, 0 unchanged, 5 not found, 0 failed");
        assert_eq!(lines.last().map(String::as_str), Some("Done!"));

        let patched = fs::read_to_string(&path).expect("read target");
        assert!(patched.contains("      case ScaffoldLevel.finale:\n"));

        // Second invocation reports no changes for the same file.
        let output = switchfix(root, &["run"]);
        let lines = stdout_lines(&output);
        assert_eq!(lines[1], format!("No changes for {}", present));
        assert!(!lines.iter().any(|line| line.contains(&*root.to_string_lossy())));
    }

    #[test]
    fn test_cli_config_file_and_json_output() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let root = workspace.path();
        fs::write(root.join("a.dart"), EXERCISE).expect("write target");
        fs::write(
            root.join("switchfix.json"),
            r#"{ "targets": ["a.dart"], "placeholder": "return const SizedBox();" }"#,
        )
        .expect("write config");

        let output = switchfix(
            root,
            &["run", "--config", "switchfix.json", "--dry-run", "--json"],
        );
        assert!(output.status.success());

        let payload: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["dry_run"], true);
        assert_eq!(payload["data"]["files"][0]["outcome"], "updated");
        assert_eq!(payload["data"]["files"][0]["insertions"][0]["line"], 7);

        // Dry run leaves the file alone.
        assert_eq!(fs::read_to_string(root.join("a.dart")).expect("read"), EXERCISE);
    }

    #[test]
    fn test_cli_invalid_config_exits_with_error() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let root = workspace.path();
        fs::write(root.join("bad.json"), r#"{ "targets": [] }"#).expect("write config");

        let output = switchfix(root, &["run", "--config", "bad.json", "--json"]);
        assert_eq!(output.status.code(), Some(1));

        let payload: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error"]["kind"], "InvalidConfig");
    }

    #[test]
    fn test_cli_scan_and_undo() {
        let workspace = TempDir::new().expect("Failed to create temp workspace");
        let root = workspace.path();
        fs::write(root.join("a.dart"), EXERCISE).expect("write target");
        fs::write(root.join("switchfix.json"), r#"{ "targets": ["a.dart"] }"#)
            .expect("write config");

        let output = switchfix(root, &["scan", "--config", "switchfix.json"]);
        let lines = stdout_lines(&output);
        assert_eq!(lines[0], "a.dart: 1 matching switch(es)");
        assert_eq!(lines[1], "  lines 3-8: missing fallback");

        let output = switchfix(
            root,
            &[
                "run",
                "--config",
                "switchfix.json",
                "--create-backup",
                "--operation-id",
                "cli-undo",
            ],
        );
        assert!(output.status.success());
        assert_ne!(fs::read_to_string(root.join("a.dart")).expect("read"), EXERCISE);

        let output = switchfix(
            root,
            &["undo", "--manifest", ".switchfix-backup/cli-undo/manifest.json"],
        );
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(fs::read_to_string(root.join("a.dart")).expect("read"), EXERCISE);
    }
}
