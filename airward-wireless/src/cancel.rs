//! Cooperative cancellation shared between the control loop and the
//! library operations it drives.
//!
//! A `CancelFlag` is set from the SIGINT handler; every suspension point
//! polls it so an interrupt unwinds to the cleanup regions instead of
//! leaving children or the interface behind.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use crate::error::{Result, WirelessError};

/// Shared cancellation flag.
pub type CancelFlag = Arc<AtomicBool>;

/// Create a fresh, unset flag.
pub fn new_cancel_flag() -> CancelFlag {
    Arc::new(AtomicBool::new(false))
}

/// Return `Err(Cancelled)` if the flag is set.
pub fn check_cancel(cancel: Option<&CancelFlag>) -> Result<()> {
    if let Some(flag) = cancel {
        if flag.load(Ordering::Relaxed) {
            return Err(WirelessError::Cancelled);
        }
    }
    Ok(())
}

/// Sleep for `duration`, waking every 100ms to observe the flag.
pub fn cancel_sleep(cancel: Option<&CancelFlag>, duration: Duration) -> Result<()> {
    if duration.is_zero() {
        return check_cancel(cancel);
    }

    let start = Instant::now();
    let tick = Duration::from_millis(100);
    while start.elapsed() < duration {
        check_cancel(cancel)?;
        let remaining = duration.saturating_sub(start.elapsed());
        std::thread::sleep(tick.min(remaining));
    }
    check_cancel(cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn unset_flag_passes() {
        let flag = new_cancel_flag();
        assert!(check_cancel(Some(&flag)).is_ok());
        assert!(check_cancel(None).is_ok());
    }

    #[test]
    fn set_flag_cancels_sleep() {
        let flag = new_cancel_flag();
        flag.store(true, Ordering::Relaxed);
        let err = cancel_sleep(Some(&flag), Duration::from_secs(5))
            .expect_err("sleep should observe the flag");
        assert!(err.is_cancelled());
    }

    #[test]
    fn zero_duration_sleep_returns_immediately() {
        assert!(cancel_sleep(None, Duration::ZERO).is_ok());
    }
}
