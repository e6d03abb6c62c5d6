//! External cracking-engine driver.
//!
//! The engine (aircrack-ng) is a black box invoked twice per artifact:
//! once against the capture alone to count usable handshakes, and once
//! with a dictionary under a hard time budget. Everything this module
//! knows about the engine comes from its textual output.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{Result, WpaError};

const ENGINE: &str = "aircrack-ng";

/// Bound on the handshake verification pass.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);
/// Default bound on the dictionary attack.
pub const DEFAULT_ATTACK_TIMEOUT: Duration = Duration::from_secs(300);

/// How many trailing progress lines to keep as diagnostics.
const PROGRESS_TAIL: usize = 10;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const TERM_GRACE: Duration = Duration::from_secs(2);

/// Classified result of one dictionary run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrackOutcome {
    /// Secret recovered.
    KeyFound(String),
    /// The engine reported success but the value was not extractable
    /// from its output. Partial success, distinct from `KeyFound`.
    KeyFoundUnextracted,
    /// Dictionary exhausted without a match. Carries up to the last
    /// ten percentage-bearing progress lines, diagnostics only.
    NotFound { progress: Vec<String> },
    /// The artifact holds no usable handshake; the attack never ran.
    NoHandshake,
    /// The attack exceeded its time budget.
    TimedOut,
}

/// One offline dictionary run against one artifact.
#[derive(Debug)]
pub struct CrackAttempt {
    /// Artifact that was attacked.
    pub artifact: PathBuf,
    /// Dictionary that was used.
    pub wordlist: PathBuf,
    /// Classified result.
    pub outcome: CrackOutcome,
}

struct EngineRun {
    stdout: String,
    timed_out: bool,
    success: bool,
}

fn stop_child(child: &mut Child) {
    if matches!(child.try_wait(), Ok(Some(_))) {
        return;
    }
    unsafe {
        let _ = libc::kill(child.id() as i32, libc::SIGTERM);
    }
    let start = Instant::now();
    while start.elapsed() < TERM_GRACE {
        if matches!(child.try_wait(), Ok(Some(_))) {
            return;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Run the engine with `args`, capturing stdout, killing it at the
/// deadline or when the stop flag is raised.
fn run_engine(
    args: &[&str],
    timeout: Duration,
    stop: Option<&Arc<AtomicBool>>,
) -> Result<EngineRun> {
    if let Some(flag) = stop {
        if flag.load(Ordering::Relaxed) {
            return Err(WpaError::Cancelled);
        }
    }

    let mut child = Command::new(ENGINE)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| WpaError::engine(format!("failed to start {}: {}", ENGINE, e)))?;

    // Drain stdout on a separate thread so a chatty engine never
    // blocks on a full pipe while we poll for exit.
    let stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| WpaError::engine("engine stdout unavailable"))?;
    let reader = std::thread::spawn(move || {
        use std::io::Read;
        let mut buf = String::new();
        let mut pipe = stdout_pipe;
        let _ = pipe.read_to_string(&mut buf);
        buf
    });

    let start = Instant::now();
    let (timed_out, success) = loop {
        if let Some(flag) = stop {
            if flag.load(Ordering::Relaxed) {
                stop_child(&mut child);
                let _ = reader.join();
                return Err(WpaError::Cancelled);
            }
        }
        match child.try_wait()? {
            Some(status) => break (false, status.success()),
            None => {
                if start.elapsed() >= timeout {
                    stop_child(&mut child);
                    break (true, false);
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    };

    let stdout = reader
        .join()
        .map_err(|_| WpaError::engine("engine output reader panicked"))?;

    Ok(EngineRun {
        stdout,
        timed_out,
        success,
    })
}

/// Highest handshake count the engine reported for the artifact.
fn handshake_count(output: &str) -> u32 {
    let re = Regex::new(r"\((\d+)\s+handshake").unwrap();
    re.captures_iter(output)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

/// Extract the bracketed secret from a `KEY FOUND` line.
fn extract_key(output: &str) -> Option<String> {
    let re = Regex::new(r"KEY FOUND[^\[]*\[\s*([^\]]*?)\s*\]").unwrap();
    re.captures(output)
        .map(|caps| caps[1].to_string())
        .filter(|key| !key.is_empty())
}

/// Last `PROGRESS_TAIL` non-empty lines carrying a percentage marker.
fn progress_tail(output: &str) -> Vec<String> {
    let mut lines: Vec<String> = output
        .lines()
        .rev()
        .filter(|line| !line.trim().is_empty() && line.contains('%'))
        .take(PROGRESS_TAIL)
        .map(|line| line.trim().to_string())
        .collect();
    lines.reverse();
    lines
}

/// Classify a completed attack run from its output and status.
fn classify_output(output: &str, success: bool) -> Result<CrackOutcome> {
    if output.contains("KEY FOUND") {
        return Ok(match extract_key(output) {
            Some(secret) => CrackOutcome::KeyFound(secret),
            None => CrackOutcome::KeyFoundUnextracted,
        });
    }
    if success {
        return Ok(CrackOutcome::NotFound {
            progress: progress_tail(output),
        });
    }
    Err(WpaError::engine(
        "engine exited with an unexpected status and no result marker",
    ))
}

/// Count usable handshakes in the artifact by running the engine
/// against it alone. The stop flag is observed throughout the run.
pub fn verify_handshake(artifact: &Path, stop: Option<&Arc<AtomicBool>>) -> Result<u32> {
    if !artifact.is_file() {
        return Err(WpaError::NoArtifact(artifact.to_path_buf()));
    }

    let artifact_str = artifact.to_string_lossy();
    let run = run_engine(&[artifact_str.as_ref()], VERIFY_TIMEOUT, stop)?;
    if run.timed_out {
        return Err(WpaError::engine("handshake verification timed out"));
    }

    let count = handshake_count(&run.stdout);
    debug!(count, artifact = %artifact.display(), "handshake verification");
    Ok(count)
}

/// Run the dictionary attack, bounded by `budget`.
pub fn run_attack(
    artifact: &Path,
    wordlist: &Path,
    budget: Duration,
    stop: Option<&Arc<AtomicBool>>,
) -> Result<CrackOutcome> {
    info!(
        wordlist = %wordlist.display(),
        budget_secs = budget.as_secs(),
        "starting dictionary attack"
    );

    let artifact_str = artifact.to_string_lossy();
    let wordlist_str = wordlist.to_string_lossy();
    let run = run_engine(
        &["-w", wordlist_str.as_ref(), artifact_str.as_ref()],
        budget,
        stop,
    )?;

    if run.timed_out {
        warn!("dictionary attack exceeded its time budget");
        return Ok(CrackOutcome::TimedOut);
    }

    classify_output(&run.stdout, run.success)
}

/// Full validate-then-attack workflow for one artifact.
///
/// An artifact reporting zero handshakes short-circuits to
/// `NoHandshake` without spending the attack budget.
pub fn crack(
    artifact: &Path,
    wordlist: &Path,
    budget: Duration,
    stop: Option<&Arc<AtomicBool>>,
) -> Result<CrackAttempt> {
    let outcome = if verify_handshake(artifact, stop)? == 0 {
        warn!("no usable handshake in capture, skipping attack");
        CrackOutcome::NoHandshake
    } else {
        run_attack(artifact, wordlist, budget, stop)?
    };

    Ok(CrackAttempt {
        artifact: artifact.to_path_buf(),
        wordlist: wordlist.to_path_buf(),
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_found_with_bracketed_value() {
        let out = "Opening capture.cap\nKEY FOUND! [ hunter2 ]\n";
        assert_eq!(
            classify_output(out, true).expect("classify"),
            CrackOutcome::KeyFound("hunter2".to_string())
        );
    }

    #[test]
    fn key_found_trims_padding() {
        let out = "KEY FOUND! [    spaced out    ]";
        assert_eq!(
            classify_output(out, true).expect("classify"),
            CrackOutcome::KeyFound("spaced out".to_string())
        );
    }

    #[test]
    fn key_found_without_value_is_partial_success() {
        assert_eq!(
            classify_output("KEY FOUND!", true).expect("classify"),
            CrackOutcome::KeyFoundUnextracted
        );
        assert_eq!(
            classify_output("KEY FOUND! [  ]", true).expect("classify"),
            CrackOutcome::KeyFoundUnextracted
        );
    }

    #[test]
    fn clean_exit_without_marker_is_not_found() {
        let out = "Tested 14344391 keys (got 1 handshake)\nPassphrase not in dictionary\n";
        let outcome = classify_output(out, true).expect("classify");
        assert!(matches!(outcome, CrackOutcome::NotFound { .. }));
    }

    #[test]
    fn unexpected_status_without_marker_is_engine_error() {
        let err = classify_output("Segmentation fault", false).expect_err("bad status");
        assert!(matches!(err, WpaError::Engine(_)));
    }

    #[test]
    fn progress_tail_keeps_last_percentage_lines() {
        let mut out = String::new();
        for i in 0..25 {
            out.push_str(&format!("[00:0{}] keys tested ({}.00%)\n", i % 10, i * 4));
        }
        out.push_str("no percentage here\n\n");
        let tail = progress_tail(&out);
        assert_eq!(tail.len(), 10);
        assert!(tail[0].contains("60.00%"));
        assert!(tail[9].contains("96.00%"));
    }

    #[test]
    fn progress_tail_is_empty_without_markers() {
        assert!(progress_tail("nothing useful\n").is_empty());
    }

    #[test]
    fn handshake_counting() {
        assert_eq!(
            handshake_count("1 potential targets\n  TestNet (1 handshake)\n"),
            1
        );
        assert_eq!(handshake_count("  TestNet (0 handshake)\n"), 0);
        assert_eq!(handshake_count("no marker at all"), 0);
        assert_eq!(
            handshake_count("A (1 handshake)\nB (3 handshake, with PMKID)\n"),
            3
        );
    }

    #[test]
    fn missing_artifact_is_rejected_before_spawning() {
        let err = verify_handshake(Path::new("/nonexistent/airward.cap"), None)
            .expect_err("missing artifact");
        assert!(matches!(err, WpaError::NoArtifact(_)));
    }

    #[test]
    fn verification_observes_the_stop_flag() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let artifact = dir.path().join("capture.cap");
        std::fs::write(&artifact, b"not a real capture").expect("write");

        let flag = Arc::new(AtomicBool::new(true));
        let err = verify_handshake(&artifact, Some(&flag)).expect_err("raised flag cancels");
        assert!(err.is_cancelled());
    }

    #[test]
    fn timed_out_and_not_found_are_distinct() {
        let not_found = classify_output("Passphrase not in dictionary", true).expect("classify");
        assert_ne!(not_found, CrackOutcome::TimedOut);
    }
}
