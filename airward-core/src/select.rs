//! Interactive target selection.
//!
//! Presents the candidate table and resolves operator input to exactly
//! one target or an explicit abort. Invalid input re-prompts; it is
//! never fatal.
//!
//! Input is read on a helper thread so the selection loop keeps
//! observing the cancel flag while the operator types: an interrupt at
//! the prompt aborts immediately instead of waiting for Enter.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use airward_wireless::{check_cancel, CancelFlag, NetworkRecord};

const ESSID_COLUMN: usize = 24;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Print the candidate table, 1-indexed.
pub fn display_networks(networks: &[NetworkRecord]) {
    println!("\n[+] Available Networks:");
    println!("{}", "=".repeat(80));
    println!(
        "{:<3} {:<25} {:<20} {:<8} {}",
        "#", "ESSID", "BSSID", "Channel", "Encryption"
    );
    println!("{}", "-".repeat(80));

    for (i, net) in networks.iter().enumerate() {
        let essid = if net.essid.chars().count() > ESSID_COLUMN {
            let head: String = net.essid.chars().take(ESSID_COLUMN).collect();
            format!("{}..", head)
        } else {
            net.essid.clone()
        };
        println!(
            "{:<3} {:<25} {:<20} {:<8} {}",
            i + 1,
            essid,
            net.bssid,
            net.channel,
            net.encryption
        );
    }
    println!("{}", "=".repeat(80));
}

/// Feed lines from `input` through a channel. The sender hanging up
/// marks end of input or a read failure; the thread exits when the
/// receiver is gone.
fn spawn_line_reader(mut input: impl BufRead + Send + 'static) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || loop {
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
        }
    });
    rx
}

/// Wait for the next line, observing the cancel flag while blocked.
fn next_line(lines: &Receiver<String>, cancel: Option<&CancelFlag>) -> Option<String> {
    loop {
        if check_cancel(cancel).is_err() {
            println!("\n[*] Selection cancelled");
            return None;
        }
        match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => return Some(line),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}

/// Read a selection from `input`.
///
/// Returns `Some(target)` for a valid 1-based index, `None` on the quit
/// token, end of input, a read failure, or cancellation. Out-of-range
/// and non-numeric input re-prompts. Cancellation is observed even
/// while the read is blocked waiting for the operator.
pub fn select_target(
    networks: &[NetworkRecord],
    input: impl BufRead + Send + 'static,
    cancel: Option<&CancelFlag>,
) -> Option<NetworkRecord> {
    let lines = spawn_line_reader(input);

    loop {
        print!("\nSelect target network (#) or 'q' to quit: ");
        let _ = std::io::stdout().flush();

        let line = next_line(&lines, cancel)?;

        let choice = line.trim();
        if choice.eq_ignore_ascii_case("q") {
            return None;
        }

        match choice.parse::<usize>() {
            Ok(idx) if (1..=networks.len()).contains(&idx) => {
                return Some(networks[idx - 1].clone());
            }
            Ok(_) => println!("[-] Invalid selection. Please try again."),
            Err(_) => println!("[-] Please enter a valid number."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airward_wireless::Encryption;
    use std::io::{self, Cursor};
    use std::sync::atomic::Ordering;
    use std::time::Instant;

    fn sample_networks() -> Vec<NetworkRecord> {
        vec![
            NetworkRecord {
                bssid: "AA:BB:CC:DD:EE:FF".to_string(),
                channel: "6".to_string(),
                essid: "TestNet".to_string(),
                encryption: Encryption::Wpa2,
            },
            NetworkRecord {
                bssid: "11:22:33:44:55:66".to_string(),
                channel: "1".to_string(),
                essid: "Attic".to_string(),
                encryption: Encryption::Wpa,
            },
        ]
    }

    /// Stands in for a terminal with nobody typing: every read blocks
    /// for longer than the test is willing to wait.
    struct StalledInput;

    impl io::Read for StalledInput {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            std::thread::sleep(Duration::from_secs(5));
            Ok(0)
        }
    }

    #[test]
    fn valid_index_selects_that_record() {
        let networks = sample_networks();
        let target = select_target(&networks, Cursor::new("1\n"), None).expect("selection");
        assert_eq!(target.essid, "TestNet");
    }

    #[test]
    fn quit_token_aborts_case_insensitively() {
        let networks = sample_networks();
        assert!(select_target(&networks, Cursor::new("q\n"), None).is_none());
        assert!(select_target(&networks, Cursor::new("Q\n"), None).is_none());
    }

    #[test]
    fn out_of_range_reprompts_until_valid() {
        let networks = sample_networks();
        let target =
            select_target(&networks, Cursor::new("0\n99\n2\n"), None).expect("selection");
        assert_eq!(target.essid, "Attic");
    }

    #[test]
    fn non_numeric_reprompts_until_valid() {
        let networks = sample_networks();
        let target =
            select_target(&networks, Cursor::new("abc\n\n1\n"), None).expect("selection");
        assert_eq!(target.essid, "TestNet");
    }

    #[test]
    fn end_of_input_aborts() {
        let networks = sample_networks();
        assert!(select_target(&networks, Cursor::new(""), None).is_none());
    }

    #[test]
    fn cancellation_aborts_before_reading() {
        let networks = sample_networks();
        let flag = airward_wireless::new_cancel_flag();
        flag.store(true, Ordering::Relaxed);
        assert!(select_target(&networks, Cursor::new("1\n"), Some(&flag)).is_none());
    }

    #[test]
    fn cancellation_unblocks_a_stalled_read() {
        let networks = sample_networks();
        let flag = airward_wireless::new_cancel_flag();
        flag.store(true, Ordering::Relaxed);

        let start = Instant::now();
        let input = io::BufReader::new(StalledInput);
        assert!(select_target(&networks, input, Some(&flag)).is_none());
        // Must return on the poll interval, not on the stalled read.
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn whitespace_around_choice_is_tolerated() {
        let networks = sample_networks();
        let target = select_target(&networks, Cursor::new("  2  \n"), None).expect("selection");
        assert_eq!(target.bssid, "11:22:33:44:55:66");
    }
}
