//! Error types for note-sync with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. Configuration and key errors are user errors,
//! per-note I/O is a system error, and encrypt/decrypt failures get their own code so
//! cron wrappers can tell "wrong key" apart from "disk full".

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for note-sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, key files, invalid args)
  User = 1,
  /// System error (walk, read, write, git)
  System = 2,
  /// Validation failure (doctor checks failed)
  Validation = 3,
  /// Encryption or decryption failed
  Crypto = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for note-sync
#[derive(Debug)]
pub enum NoteSyncError {
  /// Configuration errors
  Config(ConfigError),

  /// Key file errors
  Key(KeyError),

  /// Tree walk and per-note errors
  Sync(SyncError),

  /// Repository (git) errors
  Repository(RepositoryError),

  /// I/O errors outside of a specific note
  Io(io::Error),

  /// Generic error from JSON output or the check runner
  Message { message: String },
}

impl NoteSyncError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    NoteSyncError::Message { message: msg.into() }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      NoteSyncError::Config(_) => ExitCode::User,
      NoteSyncError::Key(_) => ExitCode::User,
      NoteSyncError::Sync(SyncError::Transform { .. }) => ExitCode::Crypto,
      NoteSyncError::Sync(_) => ExitCode::System,
      NoteSyncError::Repository(_) => ExitCode::System,
      NoteSyncError::Io(_) => ExitCode::System,
      NoteSyncError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      NoteSyncError::Config(e) => e.help_message(),
      NoteSyncError::Key(e) => e.help_message(),
      NoteSyncError::Sync(e) => e.help_message(),
      NoteSyncError::Repository(e) => e.help_message(),
      _ => None,
    }
  }
}

impl fmt::Display for NoteSyncError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NoteSyncError::Config(e) => write!(f, "{}", e),
      NoteSyncError::Key(e) => write!(f, "{}", e),
      NoteSyncError::Sync(e) => write!(f, "{}", e),
      NoteSyncError::Repository(e) => write!(f, "{}", e),
      NoteSyncError::Io(e) => write!(f, "I/O error: {}", e),
      NoteSyncError::Message { message } => write!(f, "{}", message),
    }
  }
}

impl std::error::Error for NoteSyncError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      NoteSyncError::Io(e) => Some(e),
      NoteSyncError::Sync(SyncError::Read { source, .. }) => Some(source),
      NoteSyncError::Sync(SyncError::Write { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for NoteSyncError {
  fn from(err: io::Error) -> Self {
    NoteSyncError::Io(err)
  }
}

impl From<ConfigError> for NoteSyncError {
  fn from(err: ConfigError) -> Self {
    NoteSyncError::Config(err)
  }
}

impl From<KeyError> for NoteSyncError {
  fn from(err: KeyError) -> Self {
    NoteSyncError::Key(err)
  }
}

impl From<SyncError> for NoteSyncError {
  fn from(err: SyncError) -> Self {
    NoteSyncError::Sync(err)
  }
}

impl From<RepositoryError> for NoteSyncError {
  fn from(err: RepositoryError) -> Self {
    NoteSyncError::Repository(err)
  }
}

impl From<serde_json::Error> for NoteSyncError {
  fn from(err: serde_json::Error) -> Self {
    NoteSyncError::message(format!("JSON error: {}", err))
  }
}

impl From<anyhow::Error> for NoteSyncError {
  fn from(err: anyhow::Error) -> Self {
    NoteSyncError::message(err.to_string())
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// No config file in any searched location
  NotFound { searched: Vec<PathBuf> },

  /// Config file exists but could not be read or parsed
  Parse { path: PathBuf, reason: String },

  /// Required field is missing or empty
  MissingField { field: String },

  /// Plaintext and cipher roots contain one another
  OverlappingRoots { plain_root: PathBuf, cipher_root: PathBuf },

  /// A relative path needed the home directory and none could be determined
  NoHomeDir,
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some(
        "Create ~/.config/note-sync/config.yaml (or ./config.yaml) with notes_dir, encrypted_dir and git_dir."
          .to_string(),
      ),
      ConfigError::MissingField { field } => Some(format!("Add `{}` to your config.yaml.", field)),
      ConfigError::OverlappingRoots { .. } => {
        Some("Keep the plaintext notes outside the encrypted directory and vice versa.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { searched } => {
        write!(f, "No note-sync configuration found.\nSearched:")?;
        for path in searched {
          write!(f, "\n  - {}", path.display())?;
        }
        Ok(())
      }
      ConfigError::Parse { path, reason } => {
        write!(f, "Failed to load config {}: {}", path.display(), reason)
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
      ConfigError::OverlappingRoots { plain_root, cipher_root } => write!(
        f,
        "Notes root {} and encrypted root {} overlap",
        plain_root.display(),
        cipher_root.display()
      ),
      ConfigError::NoHomeDir => write!(f, "Could not determine the home directory"),
    }
  }
}

/// Key file errors
#[derive(Debug)]
pub enum KeyError {
  /// The key path needed for this direction is not in the config
  NotConfigured { field: String },

  /// Key file missing or unreadable
  Unreadable { path: PathBuf, reason: String },

  /// Key file exists but is empty
  Empty { path: PathBuf },
}

impl KeyError {
  fn help_message(&self) -> Option<String> {
    match self {
      KeyError::NotConfigured { field } => Some(format!("Set `{}` in config.yaml.", field)),
      KeyError::Unreadable { .. } | KeyError::Empty { .. } => {
        Some("Export the key in ASCII armor, e.g. `gpg --export --armor <id> > public.asc`.".to_string())
      }
    }
  }
}

impl fmt::Display for KeyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      KeyError::NotConfigured { field } => write!(f, "Key path `{}` is not configured", field),
      KeyError::Unreadable { path, reason } => {
        write!(f, "Can't read key file {}: {}", path.display(), reason)
      }
      KeyError::Empty { path } => write!(f, "Key file {} is empty", path.display()),
    }
  }
}

/// Tree walk and per-note errors
#[derive(Debug)]
pub enum SyncError {
  /// Directory unreadable during traversal
  Walk { path: PathBuf, reason: String },

  /// Source note unreadable
  Read { path: PathBuf, source: io::Error },

  /// Target note or its parent directories could not be written
  Write { path: PathBuf, source: io::Error },

  /// Encrypt or decrypt failed for a note
  Transform { path: PathBuf, error: TransformError },

  /// A path handed to the mapper is not under the expected root
  OutsideRoot { path: PathBuf, root: PathBuf },

  /// A cipher path does not end with the cipher suffix
  MissingSuffix { path: PathBuf, suffix: String },

  /// Best-effort run finished with failures
  Incomplete { failed: usize, total: usize },
}

impl SyncError {
  fn help_message(&self) -> Option<String> {
    match self {
      SyncError::Transform {
        error: TransformError::Decrypt { .. },
        ..
      } => Some("Check that gpg_private_key matches the key the notes were encrypted to.".to_string()),
      SyncError::Transform {
        error: TransformError::Unavailable { .. },
        ..
      } => Some("Install GnuPG 2.1.14 or newer and make sure `gpg` is on PATH.".to_string()),
      SyncError::Incomplete { .. } => Some("Re-run with --json to see every failed note.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for SyncError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SyncError::Walk { path, reason } => write!(f, "Can't walk {}: {}", path.display(), reason),
      SyncError::Read { path, source } => write!(f, "Can't open note file {}: {}", path.display(), source),
      SyncError::Write { path, source } => write!(f, "Can't write file {}: {}", path.display(), source),
      SyncError::Transform { path, error } => write!(f, "{} ({})", error, path.display()),
      SyncError::OutsideRoot { path, root } => {
        write!(f, "{} is not under {}", path.display(), root.display())
      }
      SyncError::MissingSuffix { path, suffix } => {
        write!(f, "{} does not end with '{}'", path.display(), suffix)
      }
      SyncError::Incomplete { failed, total } => {
        write!(f, "{} of {} notes failed to sync", failed, total)
      }
    }
  }
}

/// Encrypt/decrypt failures reported by a crypto provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
  /// Public key malformed or encryption failed
  Encrypt { reason: String },

  /// Wrong key, wrong passphrase, or corrupt ciphertext
  Decrypt { reason: String },

  /// The crypto backend could not be started
  Unavailable { program: String, reason: String },

  /// The crypto backend did not finish in time
  TimedOut { seconds: u64 },
}

impl fmt::Display for TransformError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TransformError::Encrypt { reason } => write!(f, "Encrypt error: {}", reason),
      TransformError::Decrypt { reason } => write!(f, "Decrypt error: {}", reason),
      TransformError::Unavailable { program, reason } => {
        write!(f, "Can't run {}: {}", program, reason)
      }
      TransformError::TimedOut { seconds } => write!(f, "Crypto call timed out after {}s", seconds),
    }
  }
}

impl std::error::Error for TransformError {}

/// Git operation errors
#[derive(Debug)]
pub enum RepositoryError {
  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },

  /// Git did not finish in time
  TimedOut { command: String, seconds: u64 },
}

impl RepositoryError {
  fn help_message(&self) -> Option<String> {
    match self {
      RepositoryError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("fetch first") {
          Some("The remote has commits you don't have. Run `note-sync pull` first.".to_string())
        } else if reason.contains("Permission denied") || reason.contains("403") {
          Some("Check ssh_private_key and its access to the remote. Run `note-sync doctor` to diagnose.".to_string())
        } else {
          None
        }
      }
      RepositoryError::RepoNotFound { path } => Some(format!(
        "Clone the notes repository first or check git_dir: {}",
        path.display()
      )),
      RepositoryError::TimedOut { .. } => {
        Some("Raise git_timeout_secs in config.yaml or check network access to the remote.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for RepositoryError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RepositoryError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      RepositoryError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      RepositoryError::PushFailed { remote, branch, reason } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason)
      }
      RepositoryError::TimedOut { command, seconds } => {
        write!(f, "Git command timed out after {}s: {}", seconds, command)
      }
    }
  }
}

/// Result type alias for note-sync
pub type NoteSyncResult<T> = Result<T, NoteSyncError>;

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &NoteSyncError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
