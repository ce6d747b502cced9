//! Argument handling and startup failures

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_no_command_is_misuse() -> Result<()> {
  let env = NoteEnv::new()?;
  let output = run_note_sync(&env.home, &[])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
  Ok(())
}

#[test]
fn test_unknown_command_is_misuse() -> Result<()> {
  let env = NoteEnv::new()?;
  let output = run_note_sync(&env.home, &["sideways"])?;
  assert_eq!(output.status.code(), Some(2));
  Ok(())
}

#[test]
fn test_extra_argument_is_misuse() -> Result<()> {
  let env = NoteEnv::new()?;
  let output = run_note_sync(&env.home, &["push", "now"])?;
  assert_eq!(output.status.code(), Some(2));
  Ok(())
}

#[test]
fn test_version() -> Result<()> {
  let env = NoteEnv::new()?;
  let output = run_note_sync(&env.home, &["--version"])?;
  assert!(output.status.success());
  assert!(String::from_utf8_lossy(&output.stdout).starts_with("note-sync "));
  Ok(())
}

#[test]
fn test_missing_config_is_user_error() -> Result<()> {
  let env = NoteEnv::new()?;
  let output = run_note_sync(&env.home, &["--config", "/definitely/not/config.yaml", "push", "--no-git"])?;
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("❌"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_config_found_in_home() -> Result<()> {
  let env = NoteEnv::new()?;
  let config_dir = env.home.join(".config/note-sync");
  std::fs::create_dir_all(&config_dir)?;
  std::fs::rename(&env.config, config_dir.join("config.yaml"))?;

  // No keys configured, so push stops at key loading rather than config lookup
  let output = run_note_sync(&env.home, &["push", "--no-git"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("gpg_public_key"));
  Ok(())
}

#[test]
fn test_push_without_public_key_touches_nothing() -> Result<()> {
  let env = NoteEnv::new()?;
  env.write_note("a.md", "hello")?;

  let output = env.run(&["push", "--no-git"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(!env.repo.join("enc").exists());
  Ok(())
}

#[test]
fn test_invalid_yaml_is_user_error() -> Result<()> {
  let env = NoteEnv::new()?;
  std::fs::write(&env.config, "notes_dir: [unterminated\n")?;

  let output = env.run(&["pull", "--no-git"])?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_overlapping_roots_rejected() -> Result<()> {
  let env = NoteEnv::new()?;
  std::fs::write(
    &env.config,
    format!("notes_dir: {}\nencrypted_dir: notes\ngit_dir: {}\n", env.repo.display(), env.repo.display()),
  )?;

  let output = env.run(&["push", "--no-git"])?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}
