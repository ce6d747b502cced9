//! File-level push/pull through real gpg (`--no-git`)

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_push_then_pull_round_trip() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_note("a/b.md", "hello")?;
  env.write_note("top.md", "# top\n\nunicode: ✓\n")?;

  env.run_ok(&["push", "--no-git"])?;
  let cipher = std::fs::read_to_string(env.cipher_path("a/b.md.gpg"))?;
  assert!(cipher.starts_with("-----BEGIN PGP MESSAGE-----"));
  assert!(!cipher.contains("hello"));
  assert!(env.cipher_path("top.md.gpg").exists());

  std::fs::remove_dir_all(&env.notes)?;
  env.run_ok(&["pull", "--no-git"])?;
  assert_eq!(env.read_note("a/b.md")?, "hello");
  assert_eq!(env.read_note("top.md")?, "# top\n\nunicode: ✓\n");
  Ok(())
}

#[test]
fn test_suffix_inside_name_survives() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_note("report.gpg.md", "quarterly")?;

  env.run_ok(&["push", "--no-git"])?;
  assert!(env.cipher_path("report.gpg.md.gpg").exists());

  std::fs::remove_file(env.notes.join("report.gpg.md"))?;
  env.run_ok(&["pull", "--no-git"])?;
  assert_eq!(env.read_note("report.gpg.md")?, "quarterly");
  assert!(!env.notes.join("report.md").exists());
  Ok(())
}

#[test]
fn test_non_notes_are_ignored() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_note("todo.txt", "not a note")?;
  env.write_note("real.md", "a note")?;

  env.run_ok(&["push", "--no-git"])?;
  assert!(env.cipher_path("real.md.gpg").exists());
  assert!(!env.cipher_path("todo.txt.gpg").exists());
  Ok(())
}

#[test]
fn test_empty_notes_tree_is_noop() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.use_keys(&keys.alice, &keys.alice)?;

  let output = env.run_ok(&["push", "--no-git", "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["written"].as_array().map(Vec::len), Some(0));
  assert!(!env.repo.join("enc").exists());
  Ok(())
}

#[test]
fn test_pull_twice_gives_same_content() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_note("x/y/z.md", "deep")?;
  env.run_ok(&["push", "--no-git"])?;

  env.run_ok(&["pull", "--no-git"])?;
  let first = env.read_note("x/y/z.md")?;
  env.run_ok(&["pull", "--no-git"])?;
  assert_eq!(env.read_note("x/y/z.md")?, first);
  assert_eq!(first, "deep");
  Ok(())
}

#[test]
fn test_deleted_note_keeps_stale_ciphertext() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  let gone = env.write_note("gone.md", "soon deleted")?;
  env.write_note("kept.md", "stays")?;
  env.run_ok(&["push", "--no-git"])?;

  std::fs::remove_file(gone)?;
  env.run_ok(&["push", "--no-git"])?;
  assert!(env.cipher_path("gone.md.gpg").exists());
  Ok(())
}

#[test]
fn test_json_report_lists_written_notes() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_note("a.md", "one")?;

  let output = env.run_ok(&["push", "--no-git", "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["direction"], "push");
  let written = &report["written"][0];
  assert!(written["target"].as_str().unwrap_or_default().ends_with("a.md.gpg"));
  assert_eq!(written["sha256"].as_str().map(str::len), Some(64));
  assert_eq!(report["pulled"], false);
  Ok(())
}

/// Ciphertexts 1 and 3 are for alice, 2 is for mallory
fn mixed_cipher_tree(env: &NoteEnv, keys: &TestKeys) -> Result<()> {
  env.use_keys(&keys.mallory, &keys.alice)?;
  env.write_note("2.md", "two")?;
  env.run_ok(&["push", "--no-git"])?;
  let foreign = std::fs::read(env.cipher_path("2.md.gpg"))?;

  std::fs::remove_dir_all(&env.notes)?;
  std::fs::remove_dir_all(env.repo.join("enc"))?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_note("1.md", "one")?;
  env.write_note("3.md", "three")?;
  env.run_ok(&["push", "--no-git"])?;
  std::fs::write(env.cipher_path("2.md.gpg"), foreign)?;

  std::fs::remove_dir_all(&env.notes)?;
  Ok(())
}

#[test]
fn test_wrong_key_stops_at_first_failure() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  mixed_cipher_tree(&env, keys)?;

  let output = env.run(&["pull", "--no-git"])?;
  assert_eq!(output.status.code(), Some(4), "stderr: {}", String::from_utf8_lossy(&output.stderr));
  assert!(String::from_utf8_lossy(&output.stderr).contains("2.md.gpg"));

  assert_eq!(env.read_note("1.md")?, "one");
  assert!(!env.notes.join("2.md").exists());
  assert!(!env.notes.join("3.md").exists());
  Ok(())
}

#[test]
fn test_keep_going_reports_every_failure() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  mixed_cipher_tree(&env, keys)?;

  let output = env.run(&["pull", "--no-git", "--keep-going", "--json"])?;
  assert_eq!(output.status.code(), Some(2));
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["failures"].as_array().map(Vec::len), Some(1));
  assert_eq!(report["written"].as_array().map(Vec::len), Some(2));

  assert_eq!(env.read_note("1.md")?, "one");
  assert_eq!(env.read_note("3.md")?, "three");
  Ok(())
}

fn protected_env(keys: &TestKeys) -> Result<NoteEnv> {
  let env = NoteEnv::new()?;
  env.use_keys(&keys.protected, &keys.protected)?;
  env.write_note("a.md", "protected")?;
  env.run_ok(&["push", "--no-git"])?;
  std::fs::remove_file(env.notes.join("a.md"))?;
  Ok(env)
}

fn use_passphrase_file(env: &NoteEnv, contents: &str) -> Result<()> {
  std::fs::write(env.home.join("keys/pass"), contents)?;
  env.write_config(
    "gpg_public_key: ~/keys/public.asc\ngpg_private_key: ~/keys/private.asc\ngpg_passphrase_file: ~/keys/pass\n",
  )
}

#[test]
fn test_protected_key_decrypts_with_passphrase_file() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = protected_env(keys)?;
  use_passphrase_file(&env, &format!("{}\n", PROTECTED_PASSPHRASE))?;

  env.run_ok(&["pull", "--no-git"])?;
  assert_eq!(env.read_note("a.md")?, "protected");
  Ok(())
}

#[test]
fn test_protected_key_without_passphrase_is_decrypt_error() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = protected_env(keys)?;

  let output = env.run(&["pull", "--no-git"])?;
  assert_eq!(output.status.code(), Some(4));
  assert!(!env.notes.join("a.md").exists());
  Ok(())
}

#[test]
fn test_protected_key_with_wrong_passphrase_is_decrypt_error() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = protected_env(keys)?;
  use_passphrase_file(&env, "wrong horse\n")?;

  let output = env.run(&["pull", "--no-git"])?;
  assert_eq!(output.status.code(), Some(4));
  assert!(!env.notes.join("a.md").exists());
  Ok(())
}

#[test]
fn test_unprotected_key_ignores_passphrase_file() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_note("a.md", "secret")?;
  env.run_ok(&["push", "--no-git"])?;

  use_passphrase_file(&env, "ignored\n")?;
  std::fs::remove_file(env.notes.join("a.md"))?;
  env.run_ok(&["pull", "--no-git"])?;
  assert_eq!(env.read_note("a.md")?, "secret");
  Ok(())
}
