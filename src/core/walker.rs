//! Note enumeration under a root directory

use crate::core::error::{NoteSyncResult, SyncError};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Decides which regular files under a root are notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFilter {
  /// File name must contain this marker (e.g. ".md")
  pub marker: Option<String>,
  /// File name must end with this suffix (e.g. ".gpg" on the encrypted side)
  pub suffix: Option<String>,
}

impl NoteFilter {
  /// Accept every regular file
  pub fn all() -> Self {
    Self {
      marker: None,
      suffix: None,
    }
  }

  pub fn with_marker(marker: impl Into<String>) -> Self {
    Self {
      marker: Some(marker.into()),
      suffix: None,
    }
  }

  pub fn and_suffix(mut self, suffix: impl Into<String>) -> Self {
    self.suffix = Some(suffix.into());
    self
  }

  /// Marker and suffix are compared on the raw file name bytes
  pub fn matches(&self, path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.as_encoded_bytes()) else {
      return false;
    };

    if let Some(ref marker) = self.marker
      && !contains_bytes(name, marker.as_bytes())
    {
      return false;
    }

    if let Some(ref suffix) = self.suffix
      && !(name.ends_with(suffix.as_bytes()) && name.len() > suffix.len())
    {
      return false;
    }

    true
  }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
  needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// Recursively lists notes under a root
#[derive(Debug, Clone)]
pub struct TreeWalker {
  root: PathBuf,
  filter: NoteFilter,
}

impl TreeWalker {
  pub fn new(root: impl Into<PathBuf>, filter: NoteFilter) -> Self {
    Self {
      root: root.into(),
      filter,
    }
  }

  /// Walk the tree and return every matching regular file, sorted by path
  ///
  /// A missing root yields an empty list. Symlinks are never followed and `.git`
  /// directories are never entered. Any unreadable entry aborts the walk.
  pub fn walk(&self) -> NoteSyncResult<Vec<PathBuf>> {
    if !self.root.exists() {
      log::info!("Root {} does not exist, nothing to sync", self.root.display());
      return Ok(Vec::new());
    }

    if !self.root.is_dir() {
      return Err(
        SyncError::Walk {
          path: self.root.clone(),
          reason: "not a directory".to_string(),
        }
        .into(),
      );
    }

    let mut notes = Vec::new();
    let walker = WalkDir::new(&self.root)
      .follow_links(false)
      .sort_by_file_name()
      .into_iter()
      .filter_entry(|entry| !is_git_dir(entry));

    for entry in walker {
      let entry = entry.map_err(|e| SyncError::Walk {
        path: e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone()),
        reason: e.to_string(),
      })?;

      if entry.file_type().is_file() && self.filter.matches(entry.path()) {
        notes.push(entry.into_path());
      }
    }

    log::debug!("Found {} notes under {}", notes.len(), self.root.display());
    Ok(notes)
  }
}

fn is_git_dir(entry: &DirEntry) -> bool {
  entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == ".git"
}
