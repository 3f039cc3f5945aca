//! Conjecture - Main entry point
//!
//! Thin glue around the library: parse arguments, resolve the session,
//! run it, and map the outcome to an exit status.

use std::io::{self, Write};
use std::process::ExitCode;

use conjecture::cli::Cli;
use conjecture::config::{self, SessionConfig};
use conjecture::driver::RunDriver;
use conjecture::error::Result;
use conjecture::interrupt::{self, CancelToken, INTERRUPTED_EXIT_CODE};
use conjecture::logging;
use conjecture::seen_store::SeenStore;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) if e.is_validation() => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("Session failed: {}", e);
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let start = match &cli.start {
        Some(text) => config::parse_start(text)?,
        None => config::prompt_start(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    let session = SessionConfig::from_cli(cli, start, cli.start.is_none())?;

    // Installed after the prompt so Ctrl+C at the prompt still exits at once
    let cancel = CancelToken::new();
    if let Err(e) = interrupt::init_signal_handlers(&cancel) {
        tracing::warn!("Failed to initialize signal handlers: {}", e);
    }

    let mut store = SeenStore::open(&session.seen_path);
    tracing::info!(
        "Seen cache {} holds {} numbers",
        store.path().display(),
        store.seen().len()
    );
    let report = RunDriver::new(&mut store, io::stdout().lock(), cancel)
        .skip_seen(session.skip_seen)
        .count_frequencies(session.counting.is_some())
        .run(&session.mode, &session.start)?;

    let mut out = io::stdout().lock();
    if report.summary.interrupted {
        writeln!(out, "\nInterrupted by user. Exiting.")?;
        return Ok(if session.mode.is_unbounded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        });
    }

    if let Some(counting) = &session.counting
        && let Some(frequencies) = report.frequency_report(counting.policy, counting.min_count)
    {
        write!(out, "\n{}", frequencies)?;
    }

    writeln!(out, "Done.")?;
    Ok(ExitCode::SUCCESS)
}
