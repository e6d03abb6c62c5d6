//! Wireless interface discovery and the monitor-mode capability.
//!
//! Monitor mode is acquired and released through the external
//! `airmon-ng` tool. The renamed monitor handle is taken from the
//! tool's own success report; the conventional `<iface>mon` rename is
//! only a fallback when that report cannot be parsed.

use std::process::{Command, Stdio};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{Result, WirelessError};

/// Check if an interface exists and is wireless.
pub fn is_wireless_interface(name: &str) -> bool {
    let path = format!("/sys/class/net/{}/wireless", name);
    std::path::Path::new(&path).exists()
}

/// List all wireless interfaces on the system.
pub fn list_wireless_interfaces() -> Result<Vec<String>> {
    let mut interfaces = Vec::new();

    let net_dir = std::fs::read_dir("/sys/class/net")
        .map_err(|e| WirelessError::System(format!("Failed to read /sys/class/net: {}", e)))?;

    for entry in net_dir.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if is_wireless_interface(&name) {
            interfaces.push(name);
        }
    }

    interfaces.sort();
    Ok(interfaces)
}

/// Resolve the interface to assess: an explicit request must exist and
/// be wireless; otherwise the first wireless interface found wins.
pub fn detect_interface(requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        if !is_wireless_interface(name) {
            return Err(WirelessError::interface(format!(
                "{} is not a wireless interface",
                name
            )));
        }
        return Ok(name.to_string());
    }

    let interfaces = list_wireless_interfaces()?;
    interfaces
        .into_iter()
        .next()
        .ok_or_else(|| WirelessError::interface("no wireless interface found"))
}

/// Extract the monitor handle from airmon-ng's success output.
///
/// Typical line: `(mac80211 monitor mode vif enabled for [phy0]wlan0 on
/// [phy0]wlan0mon)`.
fn parse_monitor_handle(output: &str) -> Option<String> {
    let re = Regex::new(r"monitor mode(?:\s+vif)?\s+enabled(?:\s+for\s+\S+)?\s+on\s+(?:\[[^\]]*\])?([A-Za-z0-9]+)")
        .unwrap();
    re.captures(output)
        .map(|caps| caps[1].to_string())
        .filter(|name| !name.is_empty())
}

/// Monitor-mode capability over one interface.
///
/// Exactly one session is held per assessment. `release` is idempotent
/// and runs from `Drop` as a backstop, so no exit path leaves the
/// interface in monitor mode.
#[derive(Debug)]
pub struct MonitorSession {
    base: String,
    monitor: String,
    released: bool,
}

impl MonitorSession {
    /// Enable monitor mode on `interface` and return the session
    /// holding the renamed handle.
    pub fn enable(interface: &str) -> Result<Self> {
        info!("killing interfering processes before monitor mode");
        let _ = Command::new("airmon-ng")
            .args(["check", "kill"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        let output = Command::new("airmon-ng")
            .args(["start", interface])
            .output()
            .map_err(|e| WirelessError::monitor(format!("failed to run airmon-ng: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let brief: String = stderr.chars().take(200).collect();
            return Err(WirelessError::monitor(format!(
                "airmon-ng start {} failed: {}",
                interface,
                brief.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let monitor = match parse_monitor_handle(&stdout) {
            Some(handle) => handle,
            None => {
                debug!("airmon-ng output did not name the monitor handle, assuming rename");
                format!("{}mon", interface)
            }
        };

        info!(base = interface, monitor = %monitor, "monitor mode enabled");
        Ok(Self {
            base: interface.to_string(),
            monitor,
            released: false,
        })
    }

    /// The renamed monitor handle.
    pub fn name(&self) -> &str {
        &self.monitor
    }

    /// The original interface name.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Leave monitor mode and restore the network manager.
    ///
    /// Safe to call more than once; failures are logged, never raised.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let stopped = Command::new("airmon-ng")
            .args(["stop", &self.monitor])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if !matches!(stopped, Ok(s) if s.success()) {
            warn!(monitor = %self.monitor, "airmon-ng stop did not report success");
        }

        let _ = Command::new("systemctl")
            .args(["restart", "NetworkManager"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        info!(monitor = %self.monitor, "monitor mode released");
    }
}

impl Drop for MonitorSession {
    fn drop(&mut self) {
        if !self.released {
            warn!(monitor = %self.monitor, "monitor session dropped without release, releasing now");
            self.release();
        }
    }
}
