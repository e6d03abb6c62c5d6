//! # airward-wireless
//!
//! Wireless orchestration for the airward assessment workflow:
//! interface discovery, the monitor-mode capability, network surveys,
//! and the capture/disruption scheduler. The radio tools themselves
//! (airmon-ng, airodump-ng, aireplay-ng) are driven as external
//! processes; this crate owns their lifecycles and parses their output.
//!
//! ## Example
//!
//! ```no_run
//! use airward_wireless::{CaptureConfig, MonitorSession};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! # fn main() -> airward_wireless::Result<()> {
//! let interface = airward_wireless::detect_interface(None)?;
//! let mut monitor = MonitorSession::enable(&interface)?;
//!
//! let networks =
//!     airward_wireless::run_survey(monitor.name(), Duration::from_secs(15), None)?;
//! if let Some(target) = networks.first() {
//!     let report = airward_wireless::run_capture(
//!         monitor.name(),
//!         target,
//!         Path::new("/root/wifi_captures"),
//!         &CaptureConfig::default(),
//!         None,
//!     )?;
//!     println!("artifact: {:?}", report.artifact);
//! }
//!
//! monitor.release();
//! # Ok(())
//! # }
//! ```

#![cfg(target_os = "linux")]
#![warn(clippy::all)]

pub mod cancel;
pub mod capture;
pub mod error;
pub mod interface;
pub mod process;
pub mod survey;

pub use cancel::{cancel_sleep, check_cancel, new_cancel_flag, CancelFlag};
pub use capture::{
    run_capture, sanitize_essid, CaptureConfig, CaptureReport, ARTIFACT_SUFFIX,
};
pub use error::{Result, WirelessError};
pub use interface::{
    detect_interface, is_wireless_interface, list_wireless_interfaces, MonitorSession,
};
pub use survey::{
    parse_survey, read_survey_file, run_survey, Encryption, NetworkRecord, DEFAULT_SURVEY_SECS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if running with sufficient privileges to reconfigure the radio
/// and drive the capture tools.
pub fn check_privileges() -> bool {
    unsafe { libc::geteuid() == 0 }
}
