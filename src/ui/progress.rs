//! Progress indicator for the per-note loop
//!
//! Uses `linya` for allocation-free progress bars. Disabled by default so cron runs
//! produce plain log output only.

use linya::{Bar, Progress};

/// Progress bar over the notes of one job
pub struct NoteProgress {
  inner: Option<(Progress, Bar)>,
}

impl NoteProgress {
  /// Create a progress bar, or a no-op handle when `enabled` is false or there is nothing to do
  pub fn new(enabled: bool, total: usize, label: impl Into<String>) -> Self {
    if !enabled || total == 0 {
      return Self { inner: None };
    }
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      inner: Some((progress, bar)),
    }
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    if let Some((progress, bar)) = self.inner.as_mut() {
      progress.inc_and_draw(bar, 1);
    }
  }
}
