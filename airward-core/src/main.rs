use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use airward_core::{run_assessment, Cli};
use airward_wireless::new_cancel_flag;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(&cli) {
        Ok(recovered) => {
            if recovered {
                0
            } else {
                1
            }
        }
        Err(err) => {
            error!("assessment failed: {:#}", err);
            eprintln!("[-] Error: {:#}", err);
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<bool> {
    let cancel = new_cancel_flag();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, std::sync::atomic::Ordering::SeqCst);
    })
    .context("failed to install interrupt handler")?;

    let summary = run_assessment(cli, &cancel)?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode summary")?
        );
    }

    Ok(summary.recovered())
}
