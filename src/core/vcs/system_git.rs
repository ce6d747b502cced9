//! System git backend
//!
//! Every command runs with an isolated environment and a hard timeout, so a hung
//! remote or credential prompt can't stall an unattended run.

use super::{CommitOutcome, RepositoryClient};
use crate::core::config::CommitAuthor;
use crate::core::error::{NoteSyncResult, RepositoryError};
use crate::core::process::{CommandOutput, run_with_timeout};
use crate::utils::path_to_git_format;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Repository client using system git
pub struct SystemGit {
  /// Repository directory as configured
  repo_path: PathBuf,

  /// Working tree root reported by git
  work_tree: PathBuf,

  remote: String,
  ssh_key: Option<PathBuf>,
  author: CommitAuthor,
  timeout: Duration,
}

impl SystemGit {
  /// Open the git repository at `path`
  pub fn open(path: &Path, timeout: Duration) -> NoteSyncResult<Self> {
    if !path.is_dir() {
      return Err(RepositoryError::RepoNotFound { path: path.to_path_buf() }.into());
    }

    let mut git = Self {
      repo_path: path.to_path_buf(),
      work_tree: path.to_path_buf(),
      remote: "origin".to_string(),
      ssh_key: None,
      author: CommitAuthor::default(),
      timeout,
    };

    let output = git.run(git.git_cmd().args(["rev-parse", "--show-toplevel"]), "git rev-parse")?;
    if !output.success() {
      let stderr = output.stderr_lossy();
      if stderr.contains("not a git repository") {
        return Err(RepositoryError::RepoNotFound { path: path.to_path_buf() }.into());
      }
      return Err(
        RepositoryError::CommandFailed {
          command: "git rev-parse --show-toplevel".to_string(),
          stderr,
        }
        .into(),
      );
    }

    git.work_tree = PathBuf::from(output.stdout_lossy().trim());
    Ok(git)
  }

  pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
    self.remote = remote.into();
    self
  }

  /// Use this key for ssh remotes instead of the user's ssh setup
  pub fn with_ssh_key(mut self, ssh_key: Option<PathBuf>) -> Self {
    self.ssh_key = ssh_key;
    self
  }

  pub fn with_author(mut self, author: CommitAuthor) -> Self {
    self.author = author;
    self
  }

  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> NoteSyncResult<String> {
    let output = self.run_checked(self.git_cmd().args(["rev-parse", "HEAD"]), "git rev-parse HEAD")?;
    Ok(output.stdout_lossy().trim().to_string())
  }

  /// Get current branch name ("HEAD" when detached)
  ///
  /// Works on an unborn branch, where `rev-parse HEAD` would fail.
  pub fn current_branch(&self) -> NoteSyncResult<String> {
    let output = self.run(
      self.git_cmd().args(["symbolic-ref", "--short", "-q", "HEAD"]),
      "git symbolic-ref --short HEAD",
    )?;

    if !output.success() {
      return Ok("HEAD".to_string());
    }

    Ok(output.stdout_lossy().trim().to_string())
  }

  /// Branch to pull/push; detached HEAD has none
  fn branch_for_remote(&self) -> NoteSyncResult<String> {
    let branch = self.current_branch()?;
    if branch == "HEAD" {
      return Err(
        RepositoryError::CommandFailed {
          command: "git symbolic-ref --short HEAD".to_string(),
          stderr: "HEAD is detached; check out a branch in git_dir".to_string(),
        }
        .into(),
      );
    }
    Ok(branch)
  }

  /// Create a git command with isolated environment
  ///
  /// - Clears environment variables
  /// - Whitelists PATH, HOME and SSH_AUTH_SOCK
  /// - Never prompts for credentials
  /// - Pins the ssh key when one is configured
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    for var in ["PATH", "HOME", "SSH_AUTH_SOCK"] {
      if let Ok(value) = std::env::var(var) {
        cmd.env(var, value);
      }
    }
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.env("LC_ALL", "C");
    if let Some(ref key) = self.ssh_key {
      cmd.env("GIT_SSH_COMMAND", ssh_command(key));
    }

    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("core.quotePath=false");
    cmd.arg("-c").arg("commit.gpgsign=false");

    cmd
  }

  fn run(&self, cmd: &mut Command, label: &str) -> NoteSyncResult<CommandOutput> {
    log::debug!("Running: {}", label);
    run_with_timeout(cmd, self.timeout).map_err(|e| match e.kind() {
      io::ErrorKind::TimedOut => RepositoryError::TimedOut {
        command: label.to_string(),
        seconds: self.timeout.as_secs(),
      }
      .into(),
      _ => RepositoryError::CommandFailed {
        command: label.to_string(),
        stderr: e.to_string(),
      }
      .into(),
    })
  }

  fn run_checked(&self, cmd: &mut Command, label: &str) -> NoteSyncResult<CommandOutput> {
    let output = self.run(cmd, label)?;
    if !output.success() {
      return Err(
        RepositoryError::CommandFailed {
          command: label.to_string(),
          stderr: output.stderr_lossy(),
        }
        .into(),
      );
    }
    Ok(output)
  }

  /// Pathspec for `path`, relative to the configured repository directory
  fn pathspec(&self, path: &Path) -> String {
    match path.strip_prefix(&self.repo_path) {
      Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
      Ok(rel) => path_to_git_format(rel),
      Err(_) => path_to_git_format(path),
    }
  }

  /// Whether the index differs from HEAD
  fn has_staged_changes(&self) -> NoteSyncResult<bool> {
    let output = self.run(
      self.git_cmd().args(["diff", "--cached", "--quiet"]),
      "git diff --cached --quiet",
    )?;
    match output.status.code() {
      Some(0) => Ok(false),
      Some(1) => Ok(true),
      _ => Err(
        RepositoryError::CommandFailed {
          command: "git diff --cached --quiet".to_string(),
          stderr: output.stderr_lossy(),
        }
        .into(),
      ),
    }
  }
}

impl RepositoryClient for SystemGit {
  fn pull(&self) -> NoteSyncResult<()> {
    let branch = self.branch_for_remote()?;
    log::info!("Pulling {}/{} into {}", self.remote, branch, self.work_tree.display());

    let label = format!("git pull --ff-only {} {}", self.remote, branch);
    self.run_checked(
      self
        .git_cmd()
        .args(["pull", "--ff-only", "--no-rebase", self.remote.as_str(), branch.as_str()]),
      &label,
    )?;
    Ok(())
  }

  fn commit_and_push(&self, path_to_stage: &Path, message: &str) -> NoteSyncResult<CommitOutcome> {
    let branch = self.branch_for_remote()?;
    let pathspec = self.pathspec(path_to_stage);

    // An empty push never creates the encrypted dir; git add would reject the pathspec
    if path_to_stage.exists() {
      self.run_checked(self.git_cmd().args(["add", "-A", "--", pathspec.as_str()]), "git add")?;
    }

    let outcome = if self.has_staged_changes()? {
      let mut cmd = self.git_cmd();
      cmd
        .arg("-c")
        .arg(format!("user.name={}", self.author.name))
        .arg("-c")
        .arg(format!("user.email={}", self.author.email))
        .args(["commit", "--quiet", "--no-verify", "-m", message]);
      self.run_checked(&mut cmd, "git commit")?;

      let sha = self.head_commit()?;
      log::info!("Committed {} ({})", &sha[..sha.len().min(8)], message);
      CommitOutcome::Committed { sha }
    } else {
      log::info!("Nothing to commit under {}", path_to_stage.display());
      CommitOutcome::NothingToCommit
    };

    let output = self.run(
      self.git_cmd().args(["push", self.remote.as_str(), branch.as_str()]),
      &format!("git push {} {}", self.remote, branch),
    )?;
    if !output.success() {
      return Err(
        RepositoryError::PushFailed {
          remote: self.remote.clone(),
          branch,
          reason: output.stderr_lossy(),
        }
        .into(),
      );
    }
    log::info!("Pushed {}/{}", self.remote, branch);

    Ok(outcome)
  }
}

/// `GIT_SSH_COMMAND` pinning a single identity with no interactive prompts
fn ssh_command(key: &Path) -> String {
  let key = key.display().to_string().replace('\'', r"'\''");
  format!("ssh -i '{}' -o IdentitiesOnly=yes -o BatchMode=yes", key)
}
