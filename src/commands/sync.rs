//! `push` and `pull` commands
//!
//! Both resolve config, load the keys the direction needs, then hand a job to the
//! runner. Nothing is read from the environment after this point.

use crate::core::config::AppConfig;
use crate::core::crypto::{KeyMaterial, SystemGpg};
use crate::core::error::{NoteSyncResult, SyncError};
use crate::core::job::{JobReport, JobRunner};
use crate::core::mapping::PathMapper;
use crate::core::sync::{ErrorPolicy, SyncDirection, SyncEngine, SyncJob};
use crate::core::vcs::{CommitOutcome, RepositoryClient, SystemGit};
use std::env;
use std::path::PathBuf;

/// Flags shared by `push` and `pull`
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
  pub config: Option<PathBuf>,
  /// Skip repository pull/commit/push
  pub no_git: bool,
  pub keep_going: bool,
  pub json: bool,
  pub progress: bool,
}

/// Encrypt the notes tree into the repository, commit and push
pub fn run_push(opts: &SyncOptions) -> NoteSyncResult<()> {
  run_sync(SyncDirection::Push, opts)
}

/// Pull the repository and decrypt it into the notes tree
pub fn run_pull(opts: &SyncOptions) -> NoteSyncResult<()> {
  run_sync(SyncDirection::Pull, opts)
}

fn run_sync(direction: SyncDirection, opts: &SyncOptions) -> NoteSyncResult<()> {
  let home = dirs::home_dir();
  let cwd = env::current_dir()?;

  let config_path = AppConfig::find_config_path(opts.config.as_deref(), home.as_deref(), &cwd)?;
  log::debug!("Using config {}", config_path.display());
  let config = AppConfig::load(&config_path)?;
  let paths = config.resolve(home.as_deref())?;

  let keys = match direction {
    SyncDirection::Push => KeyMaterial::for_push(paths.public_key.as_deref())?,
    SyncDirection::Pull => KeyMaterial::for_pull(paths.private_key.as_deref(), paths.passphrase_file.as_deref())?,
  };
  let job = SyncJob::new(direction, PathMapper::new(&paths.plain_root, &paths.cipher_root), keys);

  let gpg = SystemGpg::new(config.gpg_timeout());
  let policy = if opts.keep_going {
    ErrorPolicy::KeepGoing
  } else {
    ErrorPolicy::FailFast
  };
  let engine = SyncEngine::new(&gpg)
    .with_marker(config.note_marker.clone())
    .with_policy(policy)
    .with_progress(opts.progress && !opts.json);

  let mut open_warning = None;
  let repo = if opts.no_git {
    None
  } else {
    match SystemGit::open(&paths.repo_root, config.git_timeout()) {
      Ok(git) => Some(
        git
          .with_remote(config.remote.clone())
          .with_ssh_key(paths.ssh_key.clone())
          .with_author(config.commit_author.clone()),
      ),
      Err(e) => {
        log::warn!("Repository unavailable, syncing files only: {}", e);
        open_warning = Some(format!("open: {}", e));
        None
      }
    }
  };

  let runner = JobRunner::new(engine)
    .with_repository(repo.as_ref().map(|r| r as &dyn RepositoryClient))
    .with_commit_message(config.commit_message.clone());

  let mut report = runner.run(&job)?;
  if let Some(warning) = open_warning {
    report.repository_warnings.insert(0, warning);
  }

  if opts.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_summary(&report);
  }

  if !report.sync.is_complete() {
    return Err(
      SyncError::Incomplete {
        failed: report.sync.failures.len(),
        total: report.sync.total(),
      }
      .into(),
    );
  }

  Ok(())
}

fn print_summary(report: &JobReport) {
  let sync = &report.sync;
  let verb = match sync.direction {
    SyncDirection::Push => "Encrypted",
    SyncDirection::Pull => "Decrypted",
  };

  let icon = if sync.is_complete() { "✅" } else { "⚠️ " };
  println!(
    "{} {} {}/{} notes into {}",
    icon,
    verb,
    sync.written.len(),
    sync.total(),
    sync.target_root.display()
  );

  for failure in &sync.failures {
    println!("   ❌ {}: {}", failure.source.display(), failure.error);
  }

  match &report.commit {
    Some(CommitOutcome::Committed { sha }) => println!("📦 Committed {} and pushed", &sha[..sha.len().min(8)]),
    Some(CommitOutcome::NothingToCommit) => println!("📦 Nothing new to commit, pushed"),
    None => {}
  }

  for warning in &report.repository_warnings {
    println!("   ⚠️  repository {}", warning);
  }
}
