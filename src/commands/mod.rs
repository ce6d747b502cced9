//! CLI commands for note-sync
//!
//! - **sync**: `push` (encrypt notes into the repository) and `pull` (decrypt them back)
//! - **doctor**: health checks for config, keys and tools

pub mod doctor;
pub mod sync;

pub use doctor::run_doctor;
pub use sync::{SyncOptions, run_pull, run_push};
