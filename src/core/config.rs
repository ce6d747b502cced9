use crate::core::error::{ConfigError, NoteSyncResult};
use crate::utils::expand_tilde;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in every config location
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration for note-sync
/// Searched in order: --config, ~/.config/note-sync/config.yaml, ./config.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
  /// Plaintext notes directory, relative to the home directory unless absolute
  pub notes_dir: PathBuf,

  /// Encrypted notes directory, relative to `git_dir` unless absolute
  #[serde(rename = "encrypted_dir")]
  pub enc_dir: PathBuf,

  /// Working tree of the repository holding the encrypted notes
  pub git_dir: PathBuf,

  /// ASCII-armored public key used on push
  #[serde(default)]
  pub gpg_public_key: Option<PathBuf>,

  /// ASCII-armored private key used on pull
  #[serde(default)]
  pub gpg_private_key: Option<PathBuf>,

  /// File holding the private key passphrase (absent = no passphrase)
  #[serde(default)]
  pub gpg_passphrase_file: Option<PathBuf>,

  /// SSH key used for git transport (absent = ssh defaults)
  #[serde(default)]
  pub ssh_private_key: Option<PathBuf>,

  /// Only files whose name contains this marker are treated as notes
  #[serde(default = "default_note_marker")]
  pub note_marker: String,

  #[serde(default = "default_remote")]
  pub remote: String,

  #[serde(default = "default_commit_message")]
  pub commit_message: String,

  #[serde(default)]
  pub commit_author: CommitAuthor,

  #[serde(default = "default_git_timeout_secs")]
  pub git_timeout_secs: u64,

  #[serde(default = "default_gpg_timeout_secs")]
  pub gpg_timeout_secs: u64,
}

/// Identity recorded on auto-commits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
  pub name: String,
  pub email: String,
}

impl Default for CommitAuthor {
  fn default() -> Self {
    Self {
      name: "note-sync".to_string(),
      email: "note-sync@localhost".to_string(),
    }
  }
}

fn default_note_marker() -> String {
  ".md".to_string()
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_commit_message() -> String {
  "Auto update".to_string()
}

fn default_git_timeout_secs() -> u64 {
  300
}

fn default_gpg_timeout_secs() -> u64 {
  60
}

/// Fully resolved paths for one run
///
/// Built once from [`AppConfig`] and passed explicitly to everything that touches the
/// filesystem, so nothing downstream consults the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
  pub plain_root: PathBuf,
  pub cipher_root: PathBuf,
  pub repo_root: PathBuf,
  pub public_key: Option<PathBuf>,
  pub private_key: Option<PathBuf>,
  pub passphrase_file: Option<PathBuf>,
  pub ssh_key: Option<PathBuf>,
}

impl PathConfig {
  /// Reject roots that contain one another
  pub fn validate(&self) -> NoteSyncResult<()> {
    if self.plain_root.starts_with(&self.cipher_root) || self.cipher_root.starts_with(&self.plain_root) {
      return Err(
        ConfigError::OverlappingRoots {
          plain_root: self.plain_root.clone(),
          cipher_root: self.cipher_root.clone(),
        }
        .into(),
      );
    }
    Ok(())
  }
}

impl AppConfig {
  /// Candidate config locations in lookup order
  pub fn candidate_paths(home: Option<&Path>, cwd: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = home {
      candidates.push(home.join(".config").join("note-sync").join(CONFIG_FILE_NAME));
    }
    candidates.push(cwd.join(CONFIG_FILE_NAME));
    candidates
  }

  /// Find config file: explicit path first, then the home config, then the working directory
  pub fn find_config_path(explicit: Option<&Path>, home: Option<&Path>, cwd: &Path) -> NoteSyncResult<PathBuf> {
    if let Some(path) = explicit {
      if path.is_file() {
        return Ok(path.to_path_buf());
      }
      return Err(
        ConfigError::NotFound {
          searched: vec![path.to_path_buf()],
        }
        .into(),
      );
    }

    let candidates = Self::candidate_paths(home, cwd);
    for candidate in &candidates {
      log::debug!("Checking {}", candidate.display());
      if candidate.is_file() {
        log::debug!("Config file found: {}", candidate.display());
        return Ok(candidate.clone());
      }
    }

    Err(ConfigError::NotFound { searched: candidates }.into())
  }

  /// Load and validate config from a file
  pub fn load(config_path: &Path) -> NoteSyncResult<Self> {
    let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Parse {
      path: config_path.to_path_buf(),
      reason: e.to_string(),
    })?;

    Self::from_yaml(&content, config_path)
  }

  /// Parse config from YAML text (`origin` is only used in error messages)
  pub fn from_yaml(content: &str, origin: &Path) -> NoteSyncResult<Self> {
    let config: AppConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
      path: origin.to_path_buf(),
      reason: e.to_string(),
    })?;

    config.validate()?;
    Ok(config)
  }

  /// Validate required fields
  pub fn validate(&self) -> NoteSyncResult<()> {
    let required = [
      ("notes_dir", &self.notes_dir),
      ("encrypted_dir", &self.enc_dir),
      ("git_dir", &self.git_dir),
    ];
    for (field, value) in required {
      if value.as_os_str().is_empty() {
        return Err(
          ConfigError::MissingField {
            field: field.to_string(),
          }
          .into(),
        );
      }
    }

    if self.note_marker.is_empty() {
      return Err(
        ConfigError::MissingField {
          field: "note_marker".to_string(),
        }
        .into(),
      );
    }

    Ok(())
  }

  /// Resolve every path against `home`
  ///
  /// The notes root is `home/notes_dir` and the cipher root is `git_dir/encrypted_dir`.
  /// Absolute `notes_dir`/`encrypted_dir` values are taken as-is.
  pub fn resolve(&self, home: Option<&Path>) -> NoteSyncResult<PathConfig> {
    let notes_dir = expand_tilde(&self.notes_dir, home);
    let plain_root = if notes_dir.is_absolute() {
      notes_dir
    } else {
      home.ok_or(ConfigError::NoHomeDir)?.join(notes_dir)
    };

    let repo_root = expand_tilde(&self.git_dir, home);
    let cipher_root = repo_root.join(expand_tilde(&self.enc_dir, home));
    let expand = |p: &Option<PathBuf>| p.as_deref().map(|p| expand_tilde(p, home));

    let paths = PathConfig {
      plain_root,
      cipher_root,
      repo_root,
      public_key: expand(&self.gpg_public_key),
      private_key: expand(&self.gpg_private_key),
      passphrase_file: expand(&self.gpg_passphrase_file),
      ssh_key: expand(&self.ssh_private_key),
    };
    paths.validate()?;
    Ok(paths)
  }

  pub fn git_timeout(&self) -> Duration {
    Duration::from_secs(self.git_timeout_secs)
  }

  pub fn gpg_timeout(&self) -> Duration {
    Duration::from_secs(self.gpg_timeout_secs)
  }
}
