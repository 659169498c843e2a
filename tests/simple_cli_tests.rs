use assert_cmd::prelude::*;
use assert_cmd::cargo::cargo_bin_cmd;

/// Tests that `--help` is handled successfully by the CLI.
///
/// This test verifies:
/// 1. Running `wardrobo-cli --help` exits successfully
/// 2. The help text is written to stdout and lists the subcommands
/// 3. No unexpected stderr output is produced
#[test]
fn test_cli_help_success() {
  let mut cmd = cargo_bin_cmd!("wardrobo-cli");

  let assert = cmd.arg("--help").assert().success();

  let out = assert.get_output();
  let stdout = String::from_utf8_lossy(&out.stdout);
  println!("=== wardrobo-cli --help stdout ===\n\n{}\n==================================", stdout);

  assert!(!out.stdout.is_empty(), "expected non-empty stdout for --help");
  for subcommand in ["list", "get", "search", "upload"] {
    assert!(stdout.contains(subcommand), "expected `{}` in --help output", subcommand);
  }
  assert!(
    out.stderr.is_empty(),
    "expected empty stderr for --help, got:\n{}",
    String::from_utf8_lossy(&out.stderr)
  );
}

/// Tests that a subcommand missing its required argument is rejected by clap.
#[test]
fn test_cli_get_requires_id() {
  let mut cmd = cargo_bin_cmd!("wardrobo-cli");

  let assert = cmd.arg("get").assert().failure();

  let out = assert.get_output();
  assert!(!out.stderr.is_empty(), "expected a usage error on stderr");
}

/// Tests that an unreachable server is reported on stderr with a non-zero exit.
#[test]
fn test_cli_unreachable_server() {
  let mut cmd = cargo_bin_cmd!("wardrobo-cli");

  let assert = cmd
    .args(["--server-url", "http://127.0.0.1:1", "list"])
    .assert()
    .failure();

  let out = assert.get_output();
  let stderr = String::from_utf8_lossy(&out.stderr);
  assert!(stderr.starts_with("Error: "), "unexpected stderr:\n{}", stderr);
  assert!(out.stdout.is_empty());
}

/// Tests that uploading a file that does not exist fails before any request is made.
#[test]
fn test_cli_upload_missing_file() {
  let dir = tempfile::tempdir().unwrap();
  let missing = dir.path().join("nope.png");

  let mut cmd = cargo_bin_cmd!("wardrobo-cli");

  let assert = cmd
    .args(["--server-url", "http://127.0.0.1:1", "upload"])
    .arg(&missing)
    .assert()
    .failure();

  let out = assert.get_output();
  assert!(String::from_utf8_lossy(&out.stderr).starts_with("Error: "));
}
