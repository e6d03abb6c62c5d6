//! Fatal preflight checks: privilege and external tool availability.
//!
//! These run before any capability is acquired, so failing here needs
//! no cleanup.

use std::process::{Command, Stdio};

use anyhow::{bail, Result};

/// External tools the assessment drives.
pub const REQUIRED_TOOLS: [&str; 4] = ["aircrack-ng", "airmon-ng", "airodump-ng", "aireplay-ng"];

/// Refuse to run without euid 0: monitor mode and raw capture need it.
pub fn ensure_root() -> Result<()> {
    if unsafe { libc::geteuid() } != 0 {
        bail!("this tool requires root privileges; re-run with sudo");
    }
    Ok(())
}

fn tool_available(tool: &str) -> bool {
    Command::new("which")
        .arg(tool)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Verify the external engine binaries are installed.
pub fn check_dependencies() -> Result<()> {
    println!("[+] Checking dependencies...");
    let missing: Vec<&str> = REQUIRED_TOOLS
        .iter()
        .copied()
        .filter(|tool| !tool_available(tool))
        .collect();

    if !missing.is_empty() {
        bail!(
            "missing tools: {} (install with: sudo apt install aircrack-ng)",
            missing.join(", ")
        );
    }

    println!("[+] All dependencies satisfied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_is_always_available() {
        assert!(tool_available("sh"));
    }

    #[test]
    fn bogus_tool_is_not_available() {
        assert!(!tool_available("airward-test-no-such-tool"));
    }

    #[test]
    fn root_check_matches_euid() {
        let is_root = unsafe { libc::geteuid() } == 0;
        assert_eq!(ensure_root().is_ok(), is_root);
    }
}
