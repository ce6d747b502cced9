//! Bounded subprocess execution for the git and gpg backends
//!
//! Output is captured into anonymous temp files rather than pipes so a chatty child
//! can never block on a full pipe while we poll it.

use std::io::{self, Read, Seek, SeekFrom};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished subprocess
#[derive(Debug)]
pub struct CommandOutput {
  pub status: ExitStatus,
  pub stdout: Vec<u8>,
  pub stderr: Vec<u8>,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.status.success()
  }

  pub fn stdout_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stdout).trim().to_string()
  }

  pub fn stderr_lossy(&self) -> String {
    String::from_utf8_lossy(&self.stderr).trim().to_string()
  }
}

/// Run `cmd` to completion, killing it once `timeout` elapses
///
/// Stdin is closed. A timeout surfaces as `io::ErrorKind::TimedOut`.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> io::Result<CommandOutput> {
  let mut stdout_file = tempfile::tempfile()?;
  let mut stderr_file = tempfile::tempfile()?;

  let mut child = cmd
    .stdin(Stdio::null())
    .stdout(Stdio::from(stdout_file.try_clone()?))
    .stderr(Stdio::from(stderr_file.try_clone()?))
    .spawn()?;

  let deadline = Instant::now() + timeout;
  let status = loop {
    if let Some(status) = child.try_wait()? {
      break status;
    }
    if Instant::now() >= deadline {
      // Already-exited races are fine; kill then reap
      let _ = child.kill();
      let _ = child.wait();
      return Err(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("process did not finish within {}s", timeout.as_secs()),
      ));
    }
    thread::sleep(POLL_INTERVAL);
  };

  Ok(CommandOutput {
    status,
    stdout: read_back(&mut stdout_file)?,
    stderr: read_back(&mut stderr_file)?,
  })
}

fn read_back(file: &mut std::fs::File) -> io::Result<Vec<u8>> {
  let mut buf = Vec::new();
  file.seek(SeekFrom::Start(0))?;
  file.read_to_end(&mut buf)?;
  Ok(buf)
}
