mod checks;
mod commands;
mod core;
mod ui;
mod utils;

use clap::{Args, Parser, Subcommand};
use commands::SyncOptions;
use core::error::{NoteSyncError, print_error};
use std::path::PathBuf;

/// Keep a plaintext notes tree and a GPG-encrypted git copy in sync
#[derive(Parser)]
#[command(name = "note-sync")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct NoteSyncCli {
  /// Path to config.yaml (default: ~/.config/note-sync/config.yaml, then ./config.yaml)
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Log every git and gpg command
  #[arg(short, long, global = true, conflicts_with = "quiet")]
  verbose: bool,

  /// Only log warnings and errors
  #[arg(short, long, global = true)]
  quiet: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Pull the repository and decrypt every note into the notes directory
  Pull(SyncArgs),

  /// Encrypt every note into the repository, commit and push
  Push(SyncArgs),

  /// Run health checks and diagnostics
  Doctor {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },
}

#[derive(Args)]
struct SyncArgs {
  /// Only sync files; skip git pull, commit and push
  #[arg(long)]
  no_git: bool,

  /// Continue past notes that fail and report them all at the end
  #[arg(long)]
  keep_going: bool,

  /// Print the sync report as JSON
  #[arg(long)]
  json: bool,

  /// Show a progress bar
  #[arg(long)]
  progress: bool,
}

impl SyncArgs {
  fn into_options(self, config: Option<PathBuf>) -> SyncOptions {
    SyncOptions {
      config,
      no_git: self.no_git,
      keep_going: self.keep_going,
      json: self.json,
      progress: self.progress,
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);
  let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
  let red = anstyle::Color::Ansi(anstyle::AnsiColor::Red);

  clap::builder::Styles::styled()
    .usage(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .header(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .literal(anstyle::Style::new().fg_color(Some(green)))
    .invalid(anstyle::Style::new().bold().fg_color(Some(red)))
    .error(anstyle::Style::new().bold().fg_color(Some(red)))
    .valid(anstyle::Style::new().bold().underline().fg_color(Some(green)))
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// `RUST_LOG` wins over the -v/-q flags
fn init_logging(verbose: bool, quiet: bool) {
  let level = if verbose {
    log::LevelFilter::Debug
  } else if quiet {
    log::LevelFilter::Warn
  } else {
    log::LevelFilter::Info
  };

  env_logger::Builder::new()
    .filter_level(level)
    .parse_default_env()
    .format_target(false)
    .init();
}

fn main() {
  let cli = NoteSyncCli::parse();
  init_logging(cli.verbose, cli.quiet);

  let config = cli.config;
  let result = match cli.command {
    Commands::Pull(args) => commands::run_pull(&args.into_options(config)),
    Commands::Push(args) => commands::run_push(&args.into_options(config)),
    Commands::Doctor { json } => commands::run_doctor(config.as_deref(), json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: NoteSyncError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
