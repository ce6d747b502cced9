//! Check trait abstraction for `note-sync doctor`
//!
//! Every check gets the same [`CheckContext`]: the config as loaded (or why it
//! couldn't be) and the resolved paths. Checks that need a config are skipped when
//! loading failed; the config check reports the failure once.

use crate::core::config::{AppConfig, PathConfig};
use crate::core::error::NoteSyncResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Severity level for check results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
  /// Informational message (not an issue)
  Info,
  /// Warning (a run may still succeed)
  Warning,
  /// Error (runs will fail)
  Error,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Info => write!(f, "INFO"),
      Severity::Warning => write!(f, "WARN"),
      Severity::Error => write!(f, "ERROR"),
    }
  }
}

/// Result of running a check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
  pub check_name: String,
  pub passed: bool,
  pub severity: Severity,
  pub message: String,
  /// Optional suggested fix
  pub suggestion: Option<String>,
}

impl CheckResult {
  /// Create a passing check result
  pub fn pass(check_name: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      check_name: check_name.into(),
      passed: true,
      severity: Severity::Info,
      message: message.into(),
      suggestion: None,
    }
  }

  /// Create a failing check result with error severity
  pub fn error(check_name: impl Into<String>, message: impl Into<String>, suggestion: Option<impl Into<String>>) -> Self {
    Self {
      check_name: check_name.into(),
      passed: false,
      severity: Severity::Error,
      message: message.into(),
      suggestion: suggestion.map(|s| s.into()),
    }
  }

  /// Create a failing check result with warning severity
  pub fn warning(
    check_name: impl Into<String>,
    message: impl Into<String>,
    suggestion: Option<impl Into<String>>,
  ) -> Self {
    Self {
      check_name: check_name.into(),
      passed: false,
      severity: Severity::Warning,
      message: message.into(),
      suggestion: suggestion.map(|s| s.into()),
    }
  }
}

/// Loaded configuration, or why it failed to load
pub enum LoadedConfig {
  Ready {
    path: PathBuf,
    config: Box<AppConfig>,
    paths: PathConfig,
  },
  Failed {
    message: String,
    help: Option<String>,
  },
}

/// Context passed to checks
pub struct CheckContext {
  pub loaded: LoadedConfig,
}

impl CheckContext {
  /// Locate, parse and resolve the config the same way a sync run does
  pub fn load(explicit: Option<&Path>, home: Option<&Path>, cwd: &Path) -> Self {
    let result: NoteSyncResult<LoadedConfig> = (|| {
      let path = AppConfig::find_config_path(explicit, home, cwd)?;
      let config = AppConfig::load(&path)?;
      let paths = config.resolve(home)?;
      Ok(LoadedConfig::Ready {
        path,
        config: Box::new(config),
        paths,
      })
    })();

    let loaded = result.unwrap_or_else(|e| {
      log::debug!("Config failed to load: {}", e);
      LoadedConfig::Failed {
        message: e.to_string(),
        help: e.help_message(),
      }
    });
    Self { loaded }
  }

  /// Config and resolved paths, when loading succeeded
  pub fn ready(&self) -> Option<(&AppConfig, &PathConfig)> {
    match &self.loaded {
      LoadedConfig::Ready { config, paths, .. } => Some((config.as_ref(), paths)),
      LoadedConfig::Failed { .. } => None,
    }
  }
}

/// Health check trait
///
/// Each check implements this trait to provide validation logic.
/// Checks are run in registration order by the CheckRunner.
pub trait Check: Send + Sync {
  /// Unique name for this check (kebab-case)
  fn name(&self) -> &str;

  /// Human-readable description of what this check validates
  fn description(&self) -> &str;

  /// Run the check and return a result
  fn run(&self, ctx: &CheckContext) -> NoteSyncResult<CheckResult>;

  /// Whether this check needs a loaded config
  /// Default: true
  fn requires_config(&self) -> bool {
    true
  }
}
