//! Health checks behind `note-sync doctor`
//!
//! All checks implement the `Check` trait and are registered in
//! `create_default_runner()`.
//!
//! # Built-in Checks
//!
//! - **config**: config.yaml is found and parses
//! - **roots**: notes directory and repository directory are usable
//! - **gpg-keys**: configured key files are readable
//! - **gpg**: the gpg binary runs
//! - **git-repo**: git_dir is a repository on a branch
//! - **ssh-key**: the configured SSH key exists with mode 600 or 400

mod config;
mod keys;
mod runner;
mod tools;
mod trait_def;

pub use runner::create_default_runner;
pub use trait_def::{CheckContext, Severity};
