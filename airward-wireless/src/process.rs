//! Child-process supervision helpers.
//!
//! The assessment drives several external tools: a long-running capture
//! child plus short bounded bursts. Both need the same two primitives —
//! "run to completion or kill at a deadline" and "stop a long-running
//! child, SIGTERM first".

use std::process::{Child, Command};
use std::time::{Duration, Instant};

use crate::error::{Result, WirelessError};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const TERM_GRACE: Duration = Duration::from_secs(2);

/// Outcome of a bounded child run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundedRun {
    /// Child exited (successfully or not) within the deadline.
    Completed { success: bool },
    /// Deadline hit; the child was killed.
    TimedOut,
}

/// Spawn `cmd` and wait for it, killing it once `timeout` elapses.
///
/// A non-zero exit is reported in `Completed`, not as an error; callers
/// that treat the tool as best-effort can ignore it.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<BoundedRun> {
    let mut child = cmd
        .spawn()
        .map_err(|e| WirelessError::System(format!("failed to spawn {:?}: {}", cmd.get_program(), e)))?;

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(BoundedRun::Completed {
                success: status.success(),
            });
        }
        if start.elapsed() >= timeout {
            terminate(&mut child);
            return Ok(BoundedRun::TimedOut);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Stop a child: SIGTERM, a short grace period, then SIGKILL, then reap.
///
/// Failures are swallowed; the child may already be gone.
pub fn terminate(child: &mut Child) {
    let pid = child.id() as i32;

    // Already exited?
    if matches!(child.try_wait(), Ok(Some(_))) {
        return;
    }

    unsafe {
        let _ = libc::kill(pid, libc::SIGTERM);
    }

    let start = Instant::now();
    while start.elapsed() < TERM_GRACE {
        match child.try_wait() {
            Ok(Some(_)) => return,
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(_) => break,
        }
    }

    let _ = child.kill();
    let _ = child.wait();
}
