//! Job runner: repository sync around the tree sync
//!
//! Both directions pull the notes repository first. A push then commits the encrypted
//! tree and pushes it. Repository failures never fail the job; they are logged and
//! recorded as warnings on the report.

use crate::core::error::NoteSyncResult;
use crate::core::sync::{SyncDirection, SyncEngine, SyncJob, SyncReport};
use crate::core::vcs::{CommitOutcome, RepositoryClient};
use serde::Serialize;

/// Outcome of a full job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
  #[serde(flatten)]
  pub sync: SyncReport,

  /// Whether the repository pull succeeded (false when skipped)
  pub pulled: bool,

  /// Commit-and-push outcome (push with a repository only)
  pub commit: Option<CommitOutcome>,

  pub repository_warnings: Vec<String>,
}

/// Sequences repository pull, tree sync and commit-and-push
pub struct JobRunner<'a> {
  engine: SyncEngine<'a>,
  repository: Option<&'a dyn RepositoryClient>,
  commit_message: String,
}

impl<'a> JobRunner<'a> {
  pub fn new(engine: SyncEngine<'a>) -> Self {
    Self {
      engine,
      repository: None,
      commit_message: "Auto update".to_string(),
    }
  }

  /// Run repository operations against `repository`; without one the job is local only
  pub fn with_repository(mut self, repository: Option<&'a dyn RepositoryClient>) -> Self {
    self.repository = repository;
    self
  }

  pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
    self.commit_message = message.into();
    self
  }

  pub fn run(&self, job: &SyncJob) -> NoteSyncResult<JobReport> {
    let mut warnings = Vec::new();

    let pulled = match self.repository {
      Some(repo) => match repo.pull() {
        Ok(()) => true,
        Err(e) => {
          log::warn!("Repository pull failed, continuing with local state: {}", e);
          warnings.push(format!("pull: {}", e));
          false
        }
      },
      None => {
        log::debug!("Repository operations disabled");
        false
      }
    };

    let sync = self.engine.run(job)?;

    let commit = match (job.direction, self.repository) {
      (SyncDirection::Push, Some(_)) if !sync.is_complete() => {
        let msg = format!(
          "commit skipped: {} of {} notes failed to encrypt",
          sync.failures.len(),
          sync.total()
        );
        log::warn!("Repository {}", msg);
        warnings.push(msg);
        None
      }
      (SyncDirection::Push, Some(repo)) => match repo.commit_and_push(job.target_root(), &self.commit_message) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
          log::warn!("Repository commit/push failed: {}", e);
          warnings.push(format!("commit/push: {}", e));
          None
        }
      },
      _ => None,
    };

    Ok(JobReport {
      sync,
      pulled,
      commit,
      repository_warnings: warnings,
    })
  }
}
