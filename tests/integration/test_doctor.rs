//! Tests for the `doctor` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_doctor_missing_config_fails_validation() -> Result<()> {
  let env = NoteEnv::new()?;
  std::fs::remove_file(&env.config)?;

  let output = env.run(&["doctor"])?;
  assert_eq!(output.status.code(), Some(3));
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("❌ config"), "stdout: {}", stdout);
  Ok(())
}

#[test]
fn test_doctor_json() -> Result<()> {
  let env = NoteEnv::new()?;
  std::fs::remove_file(&env.config)?;

  let output = env.run(&["doctor", "--json"])?;
  assert_eq!(output.status.code(), Some(3));
  let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let config = results
    .as_array()
    .and_then(|r| r.iter().find(|c| c["check_name"] == "config"))
    .cloned()
    .unwrap_or_default();
  assert_eq!(config["passed"], false);
  assert_eq!(config["severity"], "Error");
  Ok(())
}

#[test]
fn test_doctor_healthy_setup() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.init_git()?;
  env.use_keys(&keys.alice, &keys.alice)?;

  let output = env.run(&["doctor", "--json"])?;
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
  let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  for check in results.as_array().into_iter().flatten() {
    assert_eq!(check["passed"], true, "{}", check);
  }
  Ok(())
}
