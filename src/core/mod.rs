//! Core engine for note-sync
//!
//! - **config**: config.yaml discovery, parsing and path resolution
//! - **crypto**: encrypt/decrypt seam and key material
//! - **error**: error types with exit codes and help messages
//! - **job**: repository pull / tree sync / commit-and-push sequencing
//! - **mapping**: plaintext <-> ciphertext path mapping
//! - **process**: subprocess execution with timeouts
//! - **sync**: the per-note sync engine and its report
//! - **vcs**: repository operations (SystemGit)
//! - **walker**: note discovery under a root

pub mod config;
pub mod crypto;
pub mod error;
pub mod job;
pub mod mapping;
pub mod process;
pub mod sync;
pub mod vcs;
pub mod walker;

#[cfg(test)]
mod testing;
