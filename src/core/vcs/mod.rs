//! Repository seam used by the job runner
//!
//! - **RepositoryClient**: pull / commit-and-push operations the runner sequences
//! - **SystemGit**: client backed by the system `git` binary

pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::NoteSyncResult;
use serde::Serialize;
use std::path::Path;

/// Result of a commit-and-push
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitOutcome {
  /// A new commit was created and pushed
  Committed { sha: String },
  /// Nothing changed under the staged path; the branch was still pushed
  NothingToCommit,
}

/// Operations on the repository holding the encrypted tree
pub trait RepositoryClient {
  /// Fast-forward the local branch from the remote
  fn pull(&self) -> NoteSyncResult<()>;

  /// Stage everything under `path_to_stage`, commit with `message` and push
  fn commit_and_push(&self, path_to_stage: &Path, message: &str) -> NoteSyncResult<CommitOutcome>;
}
