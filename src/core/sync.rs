use crate::core::crypto::{CryptoProvider, KeyMaterial};
use crate::core::error::{NoteSyncResult, SyncError};
use crate::core::mapping::PathMapper;
use crate::core::walker::{NoteFilter, TreeWalker};
use crate::ui::progress::NoteProgress;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Direction of a sync job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
  /// Plaintext tree -> encrypted tree
  Push,
  /// Encrypted tree -> plaintext tree
  Pull,
}

impl SyncDirection {
  pub fn as_str(self) -> &'static str {
    match self {
      SyncDirection::Push => "push",
      SyncDirection::Pull => "pull",
    }
  }
}

/// What to do when a single note fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
  /// Abort the job on the first failing note (notes already written stay in place)
  #[default]
  FailFast,
  /// Log the failure, continue with the next note, report every failure at the end
  KeepGoing,
}

/// One directional sync run
#[derive(Debug)]
pub struct SyncJob {
  pub direction: SyncDirection,
  pub mapper: PathMapper,
  pub keys: KeyMaterial,
}

impl SyncJob {
  pub fn new(direction: SyncDirection, mapper: PathMapper, keys: KeyMaterial) -> Self {
    Self {
      direction,
      mapper,
      keys,
    }
  }

  pub fn source_root(&self) -> &Path {
    match self.direction {
      SyncDirection::Push => self.mapper.plain_root(),
      SyncDirection::Pull => self.mapper.cipher_root(),
    }
  }

  pub fn target_root(&self) -> &Path {
    match self.direction {
      SyncDirection::Push => self.mapper.cipher_root(),
      SyncDirection::Pull => self.mapper.plain_root(),
    }
  }

  /// Target path for a source note
  pub fn target_for(&self, source: &Path) -> NoteSyncResult<PathBuf> {
    match self.direction {
      SyncDirection::Push => self.mapper.to_cipher_path(source),
      SyncDirection::Pull => self.mapper.to_plain_path(source),
    }
  }
}

/// A note that was written
#[derive(Debug, Clone, Serialize)]
pub struct NoteOutcome {
  pub source: PathBuf,
  pub target: PathBuf,
  pub bytes: usize,
  /// SHA-256 of the bytes written to `target`
  pub sha256: String,
}

/// A note that failed under [`ErrorPolicy::KeepGoing`]
#[derive(Debug, Clone, Serialize)]
pub struct NoteFailure {
  pub source: PathBuf,
  pub error: String,
}

/// Result of a sync job
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
  pub direction: SyncDirection,
  pub source_root: PathBuf,
  pub target_root: PathBuf,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  pub written: Vec<NoteOutcome>,
  pub failures: Vec<NoteFailure>,
}

impl SyncReport {
  /// Number of notes attempted
  pub fn total(&self) -> usize {
    self.written.len() + self.failures.len()
  }

  pub fn is_complete(&self) -> bool {
    self.failures.is_empty()
  }
}

/// Tree sync engine
///
/// Walks the job's source root, maps every note to the target root, transforms it
/// (encrypt on push, decrypt on pull) and overwrites the target. Notes are processed
/// strictly one after another. Targets without a source are never deleted.
pub struct SyncEngine<'a> {
  crypto: &'a dyn CryptoProvider,
  marker: Option<String>,
  policy: ErrorPolicy,
  show_progress: bool,
}

impl<'a> SyncEngine<'a> {
  pub fn new(crypto: &'a dyn CryptoProvider) -> Self {
    Self {
      crypto,
      marker: None,
      policy: ErrorPolicy::FailFast,
      show_progress: false,
    }
  }

  /// Only files whose name contains `marker` are notes
  pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
    self.marker = Some(marker.into());
    self
  }

  pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn with_progress(mut self, show_progress: bool) -> Self {
    self.show_progress = show_progress;
    self
  }

  /// Filter for the job's source side; pull sources must carry the cipher suffix
  fn filter_for(&self, job: &SyncJob) -> NoteFilter {
    let filter = match &self.marker {
      Some(marker) => NoteFilter::with_marker(marker.clone()),
      None => NoteFilter::all(),
    };
    match job.direction {
      SyncDirection::Push => filter,
      SyncDirection::Pull => filter.and_suffix(job.mapper.suffix()),
    }
  }

  pub fn run(&self, job: &SyncJob) -> NoteSyncResult<SyncReport> {
    // Fail on missing keys before touching any file
    match job.direction {
      SyncDirection::Push => job.keys.public_key().map(|_| ())?,
      SyncDirection::Pull => job.keys.private_key().map(|_| ())?,
    }

    let started_at = Utc::now();
    let source_root = job.source_root();
    log::info!(
      "=> {} notes: {} -> {} ({})",
      job.direction.as_str(),
      source_root.display(),
      job.target_root().display(),
      self.crypto.name()
    );

    let notes = TreeWalker::new(source_root, self.filter_for(job)).walk()?;
    if notes.is_empty() {
      log::info!("No notes found under {}", source_root.display());
    }

    let mut progress = NoteProgress::new(
      self.show_progress,
      notes.len(),
      format!("{} {} notes", capitalize(job.direction.as_str()), notes.len()),
    );

    let mut written = Vec::with_capacity(notes.len());
    let mut failures = Vec::new();

    for source in &notes {
      match self.sync_note(job, source) {
        Ok(outcome) => written.push(outcome),
        Err(err) => {
          log::error!("Failed: {}: {}", source.display(), err);
          match self.policy {
            ErrorPolicy::FailFast => return Err(err),
            ErrorPolicy::KeepGoing => failures.push(NoteFailure {
              source: source.clone(),
              error: err.to_string(),
            }),
          }
        }
      }
      progress.inc();
    }

    log::info!(
      "{} of {} notes written to {}",
      written.len(),
      notes.len(),
      job.target_root().display()
    );

    Ok(SyncReport {
      direction: job.direction,
      source_root: source_root.to_path_buf(),
      target_root: job.target_root().to_path_buf(),
      started_at,
      finished_at: Utc::now(),
      written,
      failures,
    })
  }

  /// Map, read, transform, write a single note
  fn sync_note(&self, job: &SyncJob, source: &Path) -> NoteSyncResult<NoteOutcome> {
    log::info!("Processing: {}", source.display());

    let target = job.target_for(source)?;

    let data = fs::read(source).map_err(|e| SyncError::Read {
      path: source.to_path_buf(),
      source: e,
    })?;

    let transformed = self.transform(job, source, &data)?;
    write_note(&target, &transformed)?;
    log::info!("Written: {}", target.display());

    Ok(NoteOutcome {
      source: source.to_path_buf(),
      target,
      bytes: transformed.len(),
      sha256: format!("{:x}", Sha256::digest(&transformed)),
    })
  }

  fn transform(&self, job: &SyncJob, source: &Path, data: &[u8]) -> NoteSyncResult<Vec<u8>> {
    let result = match job.direction {
      SyncDirection::Push => self.crypto.encrypt(data, job.keys.public_key()?),
      SyncDirection::Pull => self.crypto.decrypt(data, job.keys.passphrase(), job.keys.private_key()?),
    };

    result.map_err(|error| {
      SyncError::Transform {
        path: source.to_path_buf(),
        error,
      }
      .into()
    })
  }
}

/// Replace `path` with `data`, creating parent directories (0755) and new files (0644)
///
/// The bytes go to a sibling temp file that is renamed over the target, so a failed
/// write never leaves a truncated note behind.
fn write_note(path: &Path, data: &[u8]) -> NoteSyncResult<()> {
  let write_err = |e| SyncError::Write {
    path: path.to_path_buf(),
    source: e,
  };

  let parent = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let mut dirs = fs::DirBuilder::new();
  dirs.recursive(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::DirBuilderExt;
    dirs.mode(0o755);
  }
  dirs.create(parent).map_err(write_err)?;

  let mut builder = tempfile::Builder::new();
  builder.prefix(".note-sync-");
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    builder.permissions(fs::Permissions::from_mode(0o644));
  }

  let mut file = builder.tempfile_in(parent).map_err(write_err)?;
  file.write_all(data).map_err(write_err)?;
  file.flush().map_err(write_err)?;
  file.persist(path).map_err(|e| write_err(e.error))?;
  Ok(())
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
