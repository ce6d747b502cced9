//! Health check command for diagnosing setup issues

use std::env;
use std::path::Path;

use crate::checks::{CheckContext, Severity, create_default_runner};
use crate::core::error::{ExitCode, NoteSyncResult};

/// Run the doctor command
///
/// Exits with the validation exit code if any check fails with error severity
pub fn run_doctor(config: Option<&Path>, json: bool) -> NoteSyncResult<()> {
  let home = dirs::home_dir();
  let cwd = env::current_dir()?;
  let ctx = CheckContext::load(config, home.as_deref(), &cwd);

  let runner = create_default_runner();
  let results = runner.run_all(&ctx)?;
  let has_errors = results.iter().any(|r| !r.passed && r.severity == Severity::Error);

  if json {
    println!("{}", serde_json::to_string_pretty(&results)?);
  } else {
    println!("🏥 Running health checks...\n");

    let mut has_warnings = false;

    println!("📋 Registered checks:");
    for check in runner.checks() {
      println!("   • {}: {}", check.name(), check.description());
    }
    println!();

    for result in &results {
      let icon = if result.passed { "✅" } else { "❌" };
      println!("{} {}: {}", icon, result.check_name, result.message);

      if !result.passed {
        if let Some(ref suggestion) = result.suggestion {
          println!("   💡 Fix: {}", suggestion);
        }
        if result.severity == Severity::Warning {
          has_warnings = true;
        }
      }
      println!();
    }

    let passed_count = results.iter().filter(|r| r.passed).count();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Summary: {}/{} checks passed", passed_count, results.len());

    if has_errors {
      println!("\n⚠️  Critical issues found. Fix errors before syncing.");
    } else if has_warnings {
      println!("\n⚠️  Some warnings found. Consider addressing them.");
    } else {
      println!("\n✨ All checks passed! Your setup looks healthy.");
    }
  }

  if has_errors {
    std::process::exit(ExitCode::Validation.as_i32());
  }

  Ok(())
}
