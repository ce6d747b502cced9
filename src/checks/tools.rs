//! External tool checks: gpg binary and the notes repository

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::crypto::SystemGpg;
use crate::core::error::NoteSyncResult;
use crate::core::vcs::SystemGit;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// `gpg` can be run
pub struct GpgCheck;

impl Check for GpgCheck {
  fn name(&self) -> &str {
    "gpg"
  }

  fn description(&self) -> &str {
    "Checks that the gpg binary is installed"
  }

  fn run(&self, _ctx: &CheckContext) -> NoteSyncResult<CheckResult> {
    match SystemGpg::new(PROBE_TIMEOUT).version() {
      Ok(version) => Ok(CheckResult::pass(self.name(), version)),
      Err(e) => Ok(CheckResult::error(
        self.name(),
        e.to_string(),
        Some("Install GnuPG 2.1.14 or newer"),
      )),
    }
  }

  fn requires_config(&self) -> bool {
    false
  }
}

/// `git_dir` is a git work tree on a branch
pub struct GitRepoCheck;

impl Check for GitRepoCheck {
  fn name(&self) -> &str {
    "git-repo"
  }

  fn description(&self) -> &str {
    "Opens the notes repository and reads its branch"
  }

  fn run(&self, ctx: &CheckContext) -> NoteSyncResult<CheckResult> {
    let Some((config, paths)) = ctx.ready() else {
      return Ok(CheckResult::error(self.name(), "Config not loaded", None::<String>));
    };

    let repo = match SystemGit::open(&paths.repo_root, PROBE_TIMEOUT) {
      Ok(repo) => repo,
      Err(e) => return Ok(CheckResult::error(self.name(), e.to_string(), e.help_message())),
    };

    let branch = repo.current_branch()?;
    if branch == "HEAD" {
      return Ok(CheckResult::warning(
        self.name(),
        format!("{} has a detached HEAD", repo.work_tree().display()),
        Some("Check out the branch you sync to, e.g. `git checkout main`"),
      ));
    }

    Ok(CheckResult::pass(
      self.name(),
      format!("{} on {} (remote {})", repo.work_tree().display(), branch, config.remote),
    ))
  }
}
