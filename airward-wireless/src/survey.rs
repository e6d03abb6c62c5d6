//! Network survey: drives the external survey tool and parses its
//! tabular CSV report into candidate networks.
//!
//! The report carries two tables: access points first, then per-client
//! rows. Only the access-point table is read; everything after the
//! client header is ignored. Rows are filtered down to the encryption
//! families a dictionary attack can target.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cancel::{cancel_sleep, CancelFlag};
use crate::error::{Result, WirelessError};
use crate::process::terminate;

/// Header row that opens the access-point table.
const AP_TABLE_HEADER: &str = "BSSID, First time seen";
/// Header row that opens the client table and closes the AP table.
const CLIENT_TABLE_HEADER: &str = "Station MAC";

/// Minimum comma-separated fields for a well-formed AP row.
const MIN_FIELDS: usize = 14;
const FIELD_BSSID: usize = 0;
const FIELD_CHANNEL: usize = 3;
const FIELD_PRIVACY: usize = 5;
const FIELD_ESSID: usize = 13;

/// Default survey duration.
pub const DEFAULT_SURVEY_SECS: u64 = 15;

/// Encryption families this tool can attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Encryption {
    Wpa,
    Wpa2,
    WpaWpa2,
}

impl Encryption {
    /// Parse the privacy field of a survey row. Anything outside the
    /// attackable set (OPN, WEP, WPA3, ...) is `None`.
    pub fn from_field(field: &str) -> Option<Self> {
        match field.trim() {
            "WPA" => Some(Self::Wpa),
            "WPA2" => Some(Self::Wpa2),
            "WPA WPA2" | "WPA+WPA2" => Some(Self::WpaWpa2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Encryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wpa => write!(f, "WPA"),
            Self::Wpa2 => write!(f, "WPA2"),
            Self::WpaWpa2 => write!(f, "WPA+WPA2"),
        }
    }
}

/// One discovered access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkRecord {
    /// Hardware identifier (BSSID).
    pub bssid: String,
    /// Operating channel, kept verbatim as reported.
    pub channel: String,
    /// Network name. Never empty after parsing.
    pub essid: String,
    /// Encryption family.
    pub encryption: Encryption,
}

/// Parse raw survey text into candidate networks.
///
/// Rows keep their first-appearance order. Malformed rows are skipped,
/// never fatal. Rows after the client-table header never appear.
pub fn parse_survey(raw: &str) -> Vec<NetworkRecord> {
    let mut networks = Vec::new();
    let mut in_ap_table = false;

    for line in raw.lines() {
        if line.contains(CLIENT_TABLE_HEADER) {
            break;
        }
        if line.contains(AP_TABLE_HEADER) {
            in_ap_table = true;
            continue;
        }
        if !in_ap_table || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < MIN_FIELDS {
            debug!("skipping short survey row ({} fields)", fields.len());
            continue;
        }

        let bssid = fields[FIELD_BSSID].trim();
        if bssid.is_empty() || !bssid.contains(':') {
            debug!("skipping survey row without a hardware identifier");
            continue;
        }

        let essid = fields[FIELD_ESSID].trim();
        if essid.is_empty() {
            continue;
        }

        let Some(encryption) = Encryption::from_field(fields[FIELD_PRIVACY]) else {
            continue;
        };

        networks.push(NetworkRecord {
            bssid: bssid.to_string(),
            channel: fields[FIELD_CHANNEL].trim().to_string(),
            essid: essid.to_string(),
            encryption,
        });
    }

    networks
}

/// Parse a survey report file. Unreadable or empty files yield an
/// empty list: an empty radio environment is a legitimate outcome,
/// not an error.
pub fn read_survey_file(path: &Path) -> Vec<NetworkRecord> {
    match std::fs::read_to_string(path) {
        Ok(raw) => parse_survey(&raw),
        Err(e) => {
            warn!(path = %path.display(), "survey report unreadable: {}", e);
            Vec::new()
        }
    }
}

/// Run the external survey tool on `monitor` for `duration`, then parse
/// whatever report it produced.
///
/// The survey child is always terminated, including on cancellation.
/// Temporary report files are removed afterwards.
pub fn run_survey(
    monitor: &str,
    duration: Duration,
    cancel: Option<&CancelFlag>,
) -> Result<Vec<NetworkRecord>> {
    let base = std::env::temp_dir().join(format!("airward_survey_{}", std::process::id()));
    let base_str = base.to_string_lossy().to_string();

    let mut child = Command::new("airodump-ng")
        .args(["--output-format", "csv", "--write", &base_str, monitor])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| WirelessError::survey(format!("failed to start survey process: {}", e)))?;

    let waited = cancel_sleep(cancel, duration);
    terminate(&mut child);

    let reports = survey_reports(&base);
    let networks = match reports.last() {
        Some(newest) => read_survey_file(newest),
        None => {
            warn!("survey produced no report files");
            Vec::new()
        }
    };

    for report in &reports {
        if let Err(e) = std::fs::remove_file(report) {
            debug!(path = %report.display(), "failed to remove survey report: {}", e);
        }
    }

    waited?;
    Ok(networks)
}

/// CSV report files the survey tool derived from `base`, sorted by name
/// so the last entry is the newest sequence number.
fn survey_reports(base: &Path) -> Vec<PathBuf> {
    let Some(dir) = base.parent() else {
        return Vec::new();
    };
    let Some(stem) = base.file_name().map(|n| n.to_string_lossy().to_string()) else {
        return Vec::new();
    };

    let mut reports: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                let name = p.file_name().map(|n| n.to_string_lossy().to_string());
                matches!(name, Some(n) if n.starts_with(&stem) && n.ends_with(".csv"))
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    reports.sort();
    reports
}
