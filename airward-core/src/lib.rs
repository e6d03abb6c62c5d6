//! # airward-core
//!
//! Binary crate wiring the assessment workflow together: CLI surface,
//! preflight checks, interactive target selection, and the controller
//! that sequences the wireless and WPA stages with guaranteed monitor
//! release.

#![warn(clippy::all)]

pub mod assessment;
pub mod cli;
pub mod preflight;
pub mod select;

pub use assessment::{run_assessment, AssessmentSummary};
pub use cli::Cli;
