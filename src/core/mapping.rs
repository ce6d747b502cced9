//! Path mapping between the plaintext tree and the encrypted tree
//!
//! Pure path manipulation: no filesystem access happens here. A plaintext note
//! `<plain_root>/a/b.md` maps to `<cipher_root>/a/b.md.gpg` and back.

use crate::core::error::{NoteSyncResult, SyncError};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Suffix appended to every encrypted note
pub const CIPHER_SUFFIX: &str = ".gpg";

/// Maps note paths between the two roots of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
  plain_root: PathBuf,
  cipher_root: PathBuf,
  suffix: String,
}

impl PathMapper {
  pub fn new(plain_root: impl Into<PathBuf>, cipher_root: impl Into<PathBuf>) -> Self {
    Self::with_suffix(plain_root, cipher_root, CIPHER_SUFFIX)
  }

  pub fn with_suffix(plain_root: impl Into<PathBuf>, cipher_root: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
    Self {
      plain_root: plain_root.into(),
      cipher_root: cipher_root.into(),
      suffix: suffix.into(),
    }
  }

  pub fn plain_root(&self) -> &Path {
    &self.plain_root
  }

  pub fn cipher_root(&self) -> &Path {
    &self.cipher_root
  }

  pub fn suffix(&self) -> &str {
    &self.suffix
  }

  /// `<plain_root>/rel` -> `<cipher_root>/rel<suffix>`
  pub fn to_cipher_path(&self, plain_path: &Path) -> NoteSyncResult<PathBuf> {
    let relative = strip_root(plain_path, &self.plain_root)?;
    Ok(self.cipher_root.join(self.cipher_relative(relative)?))
  }

  /// `<cipher_root>/rel<suffix>` -> `<plain_root>/rel`
  pub fn to_plain_path(&self, cipher_path: &Path) -> NoteSyncResult<PathBuf> {
    let relative = strip_root(cipher_path, &self.cipher_root)?;
    Ok(self.plain_root.join(self.plain_relative(relative)?))
  }

  /// Append the suffix to the last component of a root-relative path
  pub fn cipher_relative(&self, relative: &Path) -> NoteSyncResult<PathBuf> {
    let file_name = relative.file_name().ok_or_else(|| SyncError::OutsideRoot {
      path: relative.to_path_buf(),
      root: self.plain_root.clone(),
    })?;

    let mut name = OsString::from(file_name);
    name.push(&self.suffix);
    Ok(relative.with_file_name(name))
  }

  /// Remove exactly one trailing suffix from the last component of a root-relative path
  ///
  /// Only a trailing occurrence is removed: `report.gpg.md.gpg` becomes `report.gpg.md`.
  pub fn plain_relative(&self, relative: &Path) -> NoteSyncResult<PathBuf> {
    let missing = || SyncError::MissingSuffix {
      path: relative.to_path_buf(),
      suffix: self.suffix.clone(),
    };

    let name = relative.file_name().ok_or_else(missing)?;
    let stem = strip_name_suffix(name, &self.suffix).ok_or_else(missing)?;
    if stem.is_empty() {
      return Err(missing().into());
    }

    Ok(relative.with_file_name(stem))
  }
}

/// Remove a trailing `suffix` from a file name, comparing raw bytes
///
/// Names that are not valid UTF-8 are handled the same as any other name.
#[cfg(unix)]
fn strip_name_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
  use std::os::unix::ffi::OsStrExt;

  let stem = name.as_bytes().strip_suffix(suffix.as_bytes())?;
  Some(OsStr::from_bytes(stem).to_os_string())
}

#[cfg(not(unix))]
fn strip_name_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
  name.to_str()?.strip_suffix(suffix).map(OsString::from)
}

/// Strip `root` from `path`, refusing the root itself and anything outside it
fn strip_root<'a>(path: &'a Path, root: &Path) -> NoteSyncResult<&'a Path> {
  let outside = || SyncError::OutsideRoot {
    path: path.to_path_buf(),
    root: root.to_path_buf(),
  };

  let relative = path.strip_prefix(root).map_err(|_| outside())?;
  if relative.as_os_str().is_empty() {
    return Err(outside().into());
  }
  Ok(relative)
}
