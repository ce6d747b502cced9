//! Config and root directory checks

use super::trait_def::{Check, CheckContext, CheckResult, LoadedConfig};
use crate::core::error::NoteSyncResult;

/// Config file found, parsed and resolved
pub struct ConfigCheck;

impl Check for ConfigCheck {
  fn name(&self) -> &str {
    "config"
  }

  fn description(&self) -> &str {
    "Locates and parses config.yaml"
  }

  fn run(&self, ctx: &CheckContext) -> NoteSyncResult<CheckResult> {
    match &ctx.loaded {
      LoadedConfig::Ready { path, .. } => Ok(CheckResult::pass(self.name(), format!("Loaded {}", path.display()))),
      LoadedConfig::Failed { message, help } => Ok(CheckResult::error(self.name(), message.clone(), help.clone())),
    }
  }

  fn requires_config(&self) -> bool {
    false
  }
}

/// Plaintext root and repository layout
pub struct RootsCheck;

impl Check for RootsCheck {
  fn name(&self) -> &str {
    "roots"
  }

  fn description(&self) -> &str {
    "Validates the notes directory and the encrypted directory"
  }

  fn run(&self, ctx: &CheckContext) -> NoteSyncResult<CheckResult> {
    let Some((_, paths)) = ctx.ready() else {
      return Ok(CheckResult::error(self.name(), "Config not loaded", None::<String>));
    };

    if !paths.repo_root.is_dir() {
      return Ok(CheckResult::error(
        self.name(),
        format!("Repository directory not found: {}", paths.repo_root.display()),
        Some("Clone your notes repository to git_dir"),
      ));
    }

    if paths.plain_root.exists() && !paths.plain_root.is_dir() {
      return Ok(CheckResult::error(
        self.name(),
        format!("Notes path is not a directory: {}", paths.plain_root.display()),
        Some("Point notes_dir at a directory"),
      ));
    }

    if !paths.plain_root.exists() {
      return Ok(CheckResult::warning(
        self.name(),
        format!(
          "Notes directory does not exist yet: {} (pull will create it)",
          paths.plain_root.display()
        ),
        None::<String>,
      ));
    }

    Ok(CheckResult::pass(
      self.name(),
      format!("{} <-> {}", paths.plain_root.display(), paths.cipher_root.display()),
    ))
  }
}
