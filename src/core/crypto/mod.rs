//! Note encryption seam
//!
//! - **CryptoProvider**: encrypt/decrypt trait the sync engine is written against
//! - **KeyMaterial**: key bytes loaded once per run, wiped on drop
//! - **SystemGpg**: provider backed by the system `gpg` binary

pub mod system_gpg;

pub use system_gpg::SystemGpg;

use crate::core::error::{KeyError, NoteSyncResult, TransformError};
use std::fmt;
use std::fs;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Encrypt/decrypt operations over raw bytes
///
/// Providers receive key bytes on every call and must not keep them afterwards.
pub trait CryptoProvider {
  /// Short backend name for logs
  fn name(&self) -> &str;

  /// Encrypt `plaintext` to `public_key`, returning ASCII-armored ciphertext
  fn encrypt(&self, plaintext: &[u8], public_key: &[u8]) -> Result<Vec<u8>, TransformError>;

  /// Decrypt armored `ciphertext` with `private_key`
  ///
  /// An empty `passphrase` means the key has no passphrase.
  fn decrypt(&self, ciphertext: &[u8], passphrase: &[u8], private_key: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// Key bytes for one job
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
  public_key: Option<Vec<u8>>,
  private_key: Option<Vec<u8>>,
  passphrase: Vec<u8>,
}

impl KeyMaterial {
  /// Build key material from bytes already in memory
  #[cfg(test)]
  pub fn from_bytes(public_key: Option<Vec<u8>>, private_key: Option<Vec<u8>>, passphrase: Vec<u8>) -> Self {
    Self {
      public_key,
      private_key,
      passphrase,
    }
  }

  /// Load what a push needs: the public key
  pub fn for_push(public_key_path: Option<&Path>) -> NoteSyncResult<Self> {
    let path = public_key_path.ok_or_else(|| KeyError::NotConfigured {
      field: "gpg_public_key".to_string(),
    })?;

    Ok(Self {
      public_key: Some(read_key_file(path)?),
      private_key: None,
      passphrase: Vec::new(),
    })
  }

  /// Load what a pull needs: the private key and an optional passphrase
  pub fn for_pull(private_key_path: Option<&Path>, passphrase_path: Option<&Path>) -> NoteSyncResult<Self> {
    let path = private_key_path.ok_or_else(|| KeyError::NotConfigured {
      field: "gpg_private_key".to_string(),
    })?;
    let private_key = read_key_file(path)?;

    let passphrase = match passphrase_path {
      Some(p) => read_passphrase_file(p)?,
      None => Vec::new(),
    };

    Ok(Self {
      public_key: None,
      private_key: Some(private_key),
      passphrase,
    })
  }

  pub fn public_key(&self) -> NoteSyncResult<&[u8]> {
    self.public_key.as_deref().ok_or_else(|| {
      KeyError::NotConfigured {
        field: "gpg_public_key".to_string(),
      }
      .into()
    })
  }

  pub fn private_key(&self) -> NoteSyncResult<&[u8]> {
    self.private_key.as_deref().ok_or_else(|| {
      KeyError::NotConfigured {
        field: "gpg_private_key".to_string(),
      }
      .into()
    })
  }

  /// Passphrase bytes; empty when the key has none
  pub fn passphrase(&self) -> &[u8] {
    &self.passphrase
  }
}

impl fmt::Debug for KeyMaterial {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("KeyMaterial")
      .field("public_key", &self.public_key.as_ref().map(|_| "<redacted>"))
      .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
      .field("passphrase", &if self.passphrase.is_empty() { "<none>" } else { "<redacted>" })
      .finish()
  }
}

fn read_key_file(path: &Path) -> NoteSyncResult<Vec<u8>> {
  let bytes = fs::read(path).map_err(|e| KeyError::Unreadable {
    path: path.to_path_buf(),
    reason: e.to_string(),
  })?;

  if bytes.iter().all(|b| b.is_ascii_whitespace()) {
    return Err(KeyError::Empty { path: path.to_path_buf() }.into());
  }

  Ok(bytes)
}

fn read_passphrase_file(path: &Path) -> NoteSyncResult<Vec<u8>> {
  let mut bytes = fs::read(path).map_err(|e| KeyError::Unreadable {
    path: path.to_path_buf(),
    reason: e.to_string(),
  })?;

  // Editors leave a trailing newline; gpg reads only the first line anyway
  while matches!(bytes.last(), Some(b'\n' | b'\r')) {
    bytes.pop();
  }
  Ok(bytes)
}
