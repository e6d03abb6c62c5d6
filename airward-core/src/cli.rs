//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

use airward_wireless::DEFAULT_SURVEY_SECS;
use airward_wpa::DEFAULT_ATTACK_TIMEOUT;

#[derive(Parser, Debug)]
#[command(
    name = "airward",
    author,
    version,
    about = "Authorized Wi-Fi security assessment: survey, handshake capture, dictionary attack"
)]
pub struct Cli {
    /// Enable verbose diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Wireless interface to use instead of auto-detection
    #[arg(long)]
    pub interface: Option<String>,

    /// Dictionary file for the offline attack
    #[arg(long)]
    pub wordlist: Option<PathBuf>,

    /// Directory for capture artifacts (defaults to $HOME/wifi_captures)
    #[arg(long = "capture-dir")]
    pub capture_dir: Option<PathBuf>,

    /// Network survey duration in seconds
    #[arg(long = "survey-duration", default_value_t = DEFAULT_SURVEY_SECS)]
    pub survey_duration: u64,

    /// Handshake capture duration in seconds
    #[arg(long = "capture-duration", default_value_t = 60)]
    pub capture_duration: u64,

    /// Hard time budget for the dictionary attack in seconds
    #[arg(long = "crack-timeout", default_value_t = DEFAULT_ATTACK_TIMEOUT.as_secs())]
    pub crack_timeout: u64,

    /// Emit the final summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_documented_budgets() {
        let cli = Cli::try_parse_from(["airward"]).expect("bare invocation parses");
        assert!(!cli.verbose);
        assert_eq!(cli.survey_duration, DEFAULT_SURVEY_SECS);
        assert_eq!(cli.survey_duration, 15);
        assert_eq!(cli.capture_duration, 60);
        assert_eq!(cli.crack_timeout, DEFAULT_ATTACK_TIMEOUT.as_secs());
        assert_eq!(cli.crack_timeout, 300);
        assert!(cli.wordlist.is_none());
    }

    #[test]
    fn overrides_parse() {
        let cli = Cli::try_parse_from([
            "airward",
            "-v",
            "--interface",
            "wlan1",
            "--wordlist",
            "/tmp/words.txt",
            "--capture-duration",
            "120",
        ])
        .expect("overrides parse");
        assert!(cli.verbose);
        assert_eq!(cli.interface.as_deref(), Some("wlan1"));
        assert_eq!(cli.wordlist, Some(PathBuf::from("/tmp/words.txt")));
        assert_eq!(cli.capture_duration, 120);
    }
}
