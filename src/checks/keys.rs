//! GPG key file and SSH key checks

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::crypto::KeyMaterial;
use crate::core::error::NoteSyncResult;
#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Key files referenced by the config are readable and non-empty
pub struct GpgKeyCheck;

impl Check for GpgKeyCheck {
  fn name(&self) -> &str {
    "gpg-keys"
  }

  fn description(&self) -> &str {
    "Validates the configured public and private key files"
  }

  fn run(&self, ctx: &CheckContext) -> NoteSyncResult<CheckResult> {
    let Some((_, paths)) = ctx.ready() else {
      return Ok(CheckResult::error(self.name(), "Config not loaded", None::<String>));
    };

    if paths.public_key.is_none() && paths.private_key.is_none() {
      return Ok(CheckResult::error(
        self.name(),
        "Neither gpg_public_key nor gpg_private_key is configured",
        Some("Set gpg_public_key (for push) and gpg_private_key (for pull) in config.yaml"),
      ));
    }

    let mut ready = Vec::new();
    let mut missing = Vec::new();

    if paths.public_key.is_some() {
      KeyMaterial::for_push(paths.public_key.as_deref())?;
      ready.push("push");
    } else {
      missing.push("gpg_public_key (push)");
    }

    if paths.private_key.is_some() {
      KeyMaterial::for_pull(paths.private_key.as_deref(), paths.passphrase_file.as_deref())?;
      ready.push("pull");
    } else {
      missing.push("gpg_private_key (pull)");
    }

    if !missing.is_empty() {
      return Ok(CheckResult::warning(
        self.name(),
        format!("Keys ready for {}; not configured: {}", ready.join(", "), missing.join(", ")),
        None::<String>,
      ));
    }

    Ok(CheckResult::pass(self.name(), "Keys ready for push and pull"))
  }
}

/// Configured SSH key exists with owner-only permissions
pub struct SshKeyCheck;

impl Check for SshKeyCheck {
  fn name(&self) -> &str {
    "ssh-key"
  }

  fn description(&self) -> &str {
    "Validates the configured SSH key existence and permissions"
  }

  fn run(&self, ctx: &CheckContext) -> NoteSyncResult<CheckResult> {
    let Some((_, paths)) = ctx.ready() else {
      return Ok(CheckResult::error(self.name(), "Config not loaded", None::<String>));
    };

    let Some(ref key_path) = paths.ssh_key else {
      return Ok(CheckResult::pass(
        self.name(),
        "ssh_private_key not configured, git uses your default ssh setup",
      ));
    };

    if !key_path.is_file() {
      return Ok(CheckResult::error(
        self.name(),
        format!("SSH key not found: {}", key_path.display()),
        Some("Create one with: ssh-keygen -t ed25519 -f <path>"),
      ));
    }

    // ssh refuses keys readable by others
    #[cfg(unix)]
    {
      let mode = fs::metadata(key_path)?.permissions().mode() & 0o777;
      if mode != 0o600 && mode != 0o400 {
        return Ok(CheckResult::warning(
          self.name(),
          format!("{} has mode {:o} (should be 600 or 400)", key_path.display(), mode),
          Some(format!("Fix with: chmod 600 {}", key_path.display())),
        ));
      }
    }

    Ok(CheckResult::pass(self.name(), format!("SSH key {}", key_path.display())))
  }
}
