//! Repository sync against a local bare remote

use crate::helpers::*;
use anyhow::Result;

fn remote_log(env: &NoteEnv) -> Result<Vec<String>> {
  let output = git(&env.remote, &["log", "--format=%s", "main"])?;
  Ok(String::from_utf8_lossy(&output.stdout).lines().map(String::from).collect())
}

#[test]
fn test_push_commits_and_pushes() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.init_git()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_note("journal/today.md", "dear diary")?;

  let output = env.run_ok(&["push", "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["pulled"], true);
  assert_eq!(report["commit"]["status"], "committed");

  assert_eq!(remote_log(&env)?, vec!["Auto update", "Initial commit"]);
  let tree = git(&env.remote, &["ls-tree", "-r", "--name-only", "main"])?;
  let tree = String::from_utf8_lossy(&tree.stdout);
  assert!(tree.contains("enc/journal/today.md.gpg"));
  assert!(!tree.contains("today.md\n"));
  Ok(())
}

#[test]
fn test_custom_commit_message_and_author() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.init_git()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_config(
    "gpg_public_key: ~/keys/public.asc\ncommit_message: \"notes: sync\"\ncommit_author:\n  name: Laptop\n  email: laptop@example.com\n",
  )?;
  env.write_note("a.md", "x")?;

  env.run_ok(&["push"])?;
  let output = git(&env.remote, &["log", "-1", "--format=%s|%an|%ae", "main"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "notes: sync|Laptop|laptop@example.com");
  Ok(())
}

#[test]
fn test_pull_fast_forwards_from_remote() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let writer = NoteEnv::new()?;
  writer.init_git()?;
  writer.use_keys(&keys.alice, &keys.alice)?;

  // Second machine: a clone taken before the writer pushes
  let reader = NoteEnv::new()?;
  std::fs::remove_dir_all(&reader.repo)?;
  git(&writer.remote, &["clone", "--quiet", &writer.remote.display().to_string(), &reader.repo.display().to_string()])?;
  reader.use_keys(&keys.alice, &keys.alice)?;

  writer.write_note("shared.md", "from the laptop")?;
  writer.run_ok(&["push"])?;

  let output = reader.run_ok(&["pull", "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["pulled"], true);
  assert_eq!(reader.read_note("shared.md")?, "from the laptop");
  Ok(())
}

#[test]
fn test_unreachable_remote_is_only_a_warning() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.init_git()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  std::fs::remove_dir_all(&env.remote)?;
  env.write_note("a.md", "offline")?;

  let output = env.run_ok(&["push", "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["pulled"], false);
  assert_eq!(report["repository_warnings"].as_array().map(Vec::len), Some(2));
  assert!(env.cipher_path("a.md.gpg").exists());

  // The commit is local; it goes out with the next successful push
  let log = git(&env.repo, &["log", "-1", "--format=%s"])?;
  assert_eq!(String::from_utf8_lossy(&log.stdout).trim(), "Auto update");
  Ok(())
}

#[test]
fn test_not_a_repository_still_syncs_files() -> Result<()> {
  let Some(keys) = test_keys() else {
    return Ok(());
  };
  let env = NoteEnv::new()?;
  env.use_keys(&keys.alice, &keys.alice)?;
  env.write_note("a.md", "no git here")?;

  let output = env.run_ok(&["push", "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let warnings = report["repository_warnings"].as_array().cloned().unwrap_or_default();
  assert_eq!(warnings.len(), 1);
  assert!(warnings[0].as_str().unwrap_or_default().starts_with("open:"));
  assert!(env.cipher_path("a.md.gpg").exists());
  Ok(())
}
