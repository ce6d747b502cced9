//! Path helpers shared by config resolution and the git backend

use std::path::{Path, PathBuf};

/// Convert a path to Git format (always forward slashes)
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// Expand a leading `~` or `~/` against `home`
///
/// Paths without a leading tilde are returned unchanged. `~user` forms are not expanded.
pub fn expand_tilde(path: &Path, home: Option<&Path>) -> PathBuf {
  let Some(home) = home else {
    return path.to_path_buf();
  };

  match path.strip_prefix("~") {
    Ok(rest) => home.join(rest),
    Err(_) => path.to_path_buf(),
  }
}
