//! System gpg backend
//!
//! Every call runs in a throw-away GnuPG home (a fresh 0700 temp dir) so no key
//! material or trust state outlives the call:
//! - encrypt: `--recipient-file` straight from the public key bytes, no import needed
//! - decrypt: import the private key into the throw-away home, decrypt with loopback pinentry
//!
//! Requires GnuPG 2.1.14 or newer for `--recipient-file`.

use super::CryptoProvider;
use crate::core::error::TransformError;
use crate::core::process::{CommandOutput, run_with_timeout};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;

/// Crypto provider using the system `gpg` binary
#[derive(Debug, Clone)]
pub struct SystemGpg {
  program: PathBuf,
  timeout: Duration,
}

impl SystemGpg {
  pub fn new(timeout: Duration) -> Self {
    Self {
      program: PathBuf::from("gpg"),
      timeout,
    }
  }

  #[cfg(test)]
  pub fn with_program(program: impl Into<PathBuf>, timeout: Duration) -> Self {
    Self {
      program: program.into(),
      timeout,
    }
  }

  /// First line of `gpg --version`, or why gpg can't be run
  pub fn version(&self) -> Result<String, TransformError> {
    let mut cmd = Command::new(&self.program);
    cmd.arg("--version");
    let output = self.run(&mut cmd)?;
    if !output.success() {
      return Err(self.unavailable(output.stderr_lossy()));
    }
    Ok(output.stdout_lossy().lines().next().unwrap_or_default().to_string())
  }

  /// Create a gpg command bound to a throw-away home
  ///
  /// - Clears the environment (only PATH survives)
  /// - Forces batch mode so gpg never prompts on a tty
  fn gpg_cmd(&self, home: &GpgHome) -> Command {
    let mut cmd = Command::new(&self.program);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    cmd.env("LC_ALL", "C");

    cmd.arg("--homedir").arg(home.path());
    cmd.args(["--batch", "--yes", "--no-tty", "--quiet", "--no-permission-warning"]);
    cmd
  }

  fn run(&self, cmd: &mut Command) -> Result<CommandOutput, TransformError> {
    run_with_timeout(cmd, self.timeout).map_err(|e| match e.kind() {
      io::ErrorKind::TimedOut => TransformError::TimedOut {
        seconds: self.timeout.as_secs(),
      },
      _ => self.unavailable(e.to_string()),
    })
  }

  fn unavailable(&self, reason: impl Into<String>) -> TransformError {
    TransformError::Unavailable {
      program: self.program.display().to_string(),
      reason: reason.into(),
    }
  }
}

impl CryptoProvider for SystemGpg {
  fn name(&self) -> &str {
    "gpg"
  }

  fn encrypt(&self, plaintext: &[u8], public_key: &[u8]) -> Result<Vec<u8>, TransformError> {
    let home = GpgHome::new(false).map_err(|e| self.unavailable(e.to_string()))?;
    let encrypt_err = |e: io::Error| TransformError::Encrypt { reason: e.to_string() };

    let key_file = home.write("recipient.asc", public_key).map_err(encrypt_err)?;
    let input = home.write("message", plaintext).map_err(encrypt_err)?;
    let output = home.path().join("message.asc");

    let mut cmd = self.gpg_cmd(&home);
    cmd
      .args(["--trust-model", "always", "--armor", "--recipient-file"])
      .arg(&key_file)
      .arg("--output")
      .arg(&output)
      .arg("--encrypt")
      .arg(&input);

    let result = self.run(&mut cmd)?;
    if !result.success() {
      return Err(TransformError::Encrypt {
        reason: result.stderr_lossy(),
      });
    }

    fs::read(&output).map_err(encrypt_err)
  }

  fn decrypt(&self, ciphertext: &[u8], passphrase: &[u8], private_key: &[u8]) -> Result<Vec<u8>, TransformError> {
    let home = GpgHome::new(true).map_err(|e| self.unavailable(e.to_string()))?;
    let decrypt_err = |e: io::Error| TransformError::Decrypt { reason: e.to_string() };

    let key_file = home.write("secret.asc", private_key).map_err(decrypt_err)?;
    let input = home.write("message.asc", ciphertext).map_err(decrypt_err)?;
    let output = home.path().join("message");
    let passphrase_file = if passphrase.is_empty() {
      None
    } else {
      Some(home.write("passphrase", passphrase).map_err(decrypt_err)?)
    };

    let with_pinentry = |cmd: &mut Command| {
      cmd.args(["--pinentry-mode", "loopback"]);
      if let Some(ref pf) = passphrase_file {
        cmd.arg("--passphrase-file").arg(pf);
      }
    };

    let mut import = self.gpg_cmd(&home);
    with_pinentry(&mut import);
    import.arg("--import").arg(&key_file);
    let imported = self.run(&mut import)?;
    if !imported.success() {
      return Err(TransformError::Decrypt {
        reason: format!("can't import private key: {}", imported.stderr_lossy()),
      });
    }

    let mut cmd = self.gpg_cmd(&home);
    with_pinentry(&mut cmd);
    cmd.arg("--output").arg(&output).arg("--decrypt").arg(&input);

    let result = self.run(&mut cmd)?;
    if !result.success() {
      return Err(TransformError::Decrypt {
        reason: result.stderr_lossy(),
      });
    }

    fs::read(&output).map_err(decrypt_err)
  }
}

/// Throw-away GnuPG home directory
///
/// Decrypt spawns a gpg-agent bound to this home; it is stopped on drop so agents
/// don't pile up across notes.
struct GpgHome {
  dir: TempDir,
  uses_agent: bool,
}

impl GpgHome {
  fn new(uses_agent: bool) -> io::Result<Self> {
    let dir = tempfile::Builder::new().prefix("note-sync-gpg-").tempdir()?;
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o700))?;
    }
    Ok(Self { dir, uses_agent })
  }

  fn path(&self) -> &Path {
    self.dir.path()
  }

  fn write(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
    let path = self.dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
  }
}

impl Drop for GpgHome {
  fn drop(&mut self) {
    if !self.uses_agent {
      return;
    }
    let mut cmd = Command::new("gpgconf");
    cmd.arg("--homedir").arg(self.dir.path()).args(["--kill", "gpg-agent"]);
    if let Err(e) = run_with_timeout(&mut cmd, Duration::from_secs(10)) {
      log::debug!("Could not stop gpg-agent for {}: {}", self.dir.path().display(), e);
    }
  }
}
