//! In-memory fakes for the crypto and repository seams

use crate::core::crypto::CryptoProvider;
use crate::core::error::{NoteSyncResult, RepositoryError, TransformError};
use crate::core::vcs::{CommitOutcome, RepositoryClient};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

const HEADER: &[u8] = b"-----BEGIN FAKE MESSAGE-----\n";

/// Reversible fake cipher
///
/// Public keys look like `pub:<id>`, private keys like `priv:<id>`. Ciphertext records
/// the key id, so decrypting with another id fails like a wrong gpg key would.
#[derive(Default)]
pub struct FakeCrypto {
  pub calls: RefCell<usize>,
}

impl FakeCrypto {
  pub fn new() -> Self {
    Self::default()
  }
}

fn key_id<'a>(key: &'a [u8], prefix: &[u8]) -> Option<&'a [u8]> {
  key.strip_prefix(prefix).filter(|id| !id.is_empty())
}

impl CryptoProvider for FakeCrypto {
  fn name(&self) -> &str {
    "fake"
  }

  fn encrypt(&self, plaintext: &[u8], public_key: &[u8]) -> Result<Vec<u8>, TransformError> {
    *self.calls.borrow_mut() += 1;
    let id = key_id(public_key, b"pub:").ok_or_else(|| TransformError::Encrypt {
      reason: "malformed public key".to_string(),
    })?;

    let mut out = HEADER.to_vec();
    out.extend_from_slice(id);
    out.push(b'\n');
    out.extend(plaintext.iter().rev().map(|b| b ^ 0x5a));
    Ok(out)
  }

  fn decrypt(&self, ciphertext: &[u8], passphrase: &[u8], private_key: &[u8]) -> Result<Vec<u8>, TransformError> {
    *self.calls.borrow_mut() += 1;
    let corrupt = || TransformError::Decrypt {
      reason: "corrupt ciphertext".to_string(),
    };

    let id = key_id(private_key, b"priv:").ok_or_else(|| TransformError::Decrypt {
      reason: "malformed private key".to_string(),
    })?;
    if !passphrase.is_empty() && passphrase != b"correct" {
      return Err(TransformError::Decrypt {
        reason: "bad passphrase".to_string(),
      });
    }

    let body = ciphertext.strip_prefix(HEADER).ok_or_else(corrupt)?;
    let newline = body.iter().position(|b| *b == b'\n').ok_or_else(corrupt)?;
    if &body[..newline] != id {
      return Err(TransformError::Decrypt {
        reason: "no secret key".to_string(),
      });
    }

    Ok(body[newline + 1..].iter().rev().map(|b| b ^ 0x5a).collect())
  }
}

/// Records repository calls; can be told to fail
#[derive(Default)]
pub struct FakeRepository {
  pub calls: RefCell<Vec<String>>,
  pub fail_pull: bool,
  pub fail_push: bool,
}

impl RepositoryClient for FakeRepository {
  fn pull(&self) -> NoteSyncResult<()> {
    self.calls.borrow_mut().push("pull".to_string());
    if self.fail_pull {
      return Err(
        RepositoryError::CommandFailed {
          command: "git pull".to_string(),
          stderr: "Could not resolve host".to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }

  fn commit_and_push(&self, path_to_stage: &Path, message: &str) -> NoteSyncResult<CommitOutcome> {
    self
      .calls
      .borrow_mut()
      .push(format!("commit_and_push {} {}", path_to_stage.display(), message));
    if self.fail_push {
      return Err(
        RepositoryError::PushFailed {
          remote: "origin".to_string(),
          branch: "main".to_string(),
          reason: "non-fast-forward".to_string(),
        }
        .into(),
      );
    }
    Ok(CommitOutcome::Committed {
      sha: "0123456789abcdef0123456789abcdef01234567".to_string(),
    })
  }
}

/// Write `contents` at `root/rel`, creating parents
pub fn write_file(root: &Path, rel: &str, contents: &[u8]) -> PathBuf {
  let path = root.join(rel);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(&path, contents).unwrap();
  path
}

#[test]
fn fake_crypto_round_trips() {
  let crypto = FakeCrypto::new();
  let armored = crypto.encrypt(b"hello\x00\xff", b"pub:k1").unwrap();
  assert!(armored.starts_with(HEADER));
  assert_eq!(crypto.decrypt(&armored, b"", b"priv:k1").unwrap(), b"hello\x00\xff");
  assert!(crypto.decrypt(&armored, b"", b"priv:k2").is_err());
}
