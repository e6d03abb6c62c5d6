//! # airward-wpa
//!
//! Offline dictionary-attack workflow for airward: resolves the
//! dictionary resource (with a compressed-source fallback), verifies
//! that a capture artifact actually holds a usable handshake, and
//! drives the external cracking engine under a hard time budget,
//! classifying its textual output into a `CrackOutcome`.

#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod wordlist;

pub use engine::{
    crack, run_attack, verify_handshake, CrackAttempt, CrackOutcome, DEFAULT_ATTACK_TIMEOUT,
    VERIFY_TIMEOUT,
};
pub use error::{Result, WpaError};
pub use wordlist::{resolve_wordlist, DEFAULT_WORDLIST};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
